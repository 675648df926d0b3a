use crate::error::{Error, Result};
use crate::pose::{Environment, Placement};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use bytemuck::{Pod, Zeroable};

pub const CODE_VERSION: u8 = 0x01;

pub const CODE_KIND_ENVIRONMENT: u8 = 0x01;
pub const CODE_KIND_PLACEMENT: u8 = 0x02;

#[repr(C, packed)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct CodeHeader {
    b_version: u8,
    b_kind: u8,
    w_count: u16,
}

#[repr(C, packed)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct MarkerRecord {
    fl_x: f32,
    fl_y: f32,
    fl_z: f32,
}

#[repr(C, packed)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct PlacementRecord {
    fl_x: f32,
    fl_y: f32,
    fl_z: f32,
    fl_qx: f32,
    fl_qy: f32,
    fl_qz: f32,
    fl_qw: f32,
}

fn decode_header(bytes: &[u8], kind: u8) -> Result<CodeHeader> {
    let header_size = std::mem::size_of::<CodeHeader>();
    if bytes.len() < header_size {
        return Err(Error::CodeTooShort {
            expected: header_size,
            actual: bytes.len(),
        });
    }

    let header: CodeHeader = bytemuck::pod_read_unaligned(&bytes[..header_size]);

    if header.b_version != CODE_VERSION {
        return Err(Error::UnsupportedCodeVersion(header.b_version));
    }
    if header.b_kind != kind {
        return Err(Error::UnexpectedCodeKind(header.b_kind));
    }

    Ok(header)
}

/// Decode a serialized environment code into its marker layout.
pub fn decode_environment(code: &str) -> Result<Environment> {
    let bytes = URL_SAFE_NO_PAD.decode(code)?;
    let header = decode_header(&bytes, CODE_KIND_ENVIRONMENT)?;

    let count = header.w_count as usize;
    if count == 0 {
        return Err(Error::EmptyEnvironment);
    }

    let header_size = std::mem::size_of::<CodeHeader>();
    let record_size = std::mem::size_of::<MarkerRecord>();
    let expected = header_size + count * record_size;
    if bytes.len() < expected {
        return Err(Error::CodeTooShort {
            expected,
            actual: bytes.len(),
        });
    }

    let mut markers = Vec::with_capacity(count);
    for i in 0..count {
        let offset = header_size + i * record_size;
        let record: MarkerRecord =
            bytemuck::pod_read_unaligned(&bytes[offset..offset + record_size]);
        markers.push([record.fl_x, record.fl_y, record.fl_z]);
    }

    Ok(Environment { markers })
}

pub fn encode_environment(environment: &Environment) -> Result<String> {
    if environment.markers.is_empty() {
        return Err(Error::EmptyEnvironment);
    }
    if environment.markers.len() > u16::MAX as usize {
        return Err(Error::TooManyMarkers(environment.markers.len()));
    }

    let header = CodeHeader {
        b_version: CODE_VERSION,
        b_kind: CODE_KIND_ENVIRONMENT,
        w_count: environment.markers.len() as u16,
    };

    let record_size = std::mem::size_of::<MarkerRecord>();
    let mut bytes =
        Vec::with_capacity(std::mem::size_of::<CodeHeader>() + environment.markers.len() * record_size);
    bytes.extend_from_slice(bytemuck::bytes_of(&header));
    for marker in &environment.markers {
        let record = MarkerRecord {
            fl_x: marker[0],
            fl_y: marker[1],
            fl_z: marker[2],
        };
        bytes.extend_from_slice(bytemuck::bytes_of(&record));
    }

    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Decode a serialized placement code into the mounting offset it describes.
pub fn decode_placement(code: &str) -> Result<Placement> {
    let bytes = URL_SAFE_NO_PAD.decode(code)?;
    decode_header(&bytes, CODE_KIND_PLACEMENT)?;

    let header_size = std::mem::size_of::<CodeHeader>();
    let record_size = std::mem::size_of::<PlacementRecord>();
    let expected = header_size + record_size;
    if bytes.len() < expected {
        return Err(Error::CodeTooShort {
            expected,
            actual: bytes.len(),
        });
    }

    let record: PlacementRecord =
        bytemuck::pod_read_unaligned(&bytes[header_size..header_size + record_size]);

    Ok(Placement {
        position: [record.fl_x, record.fl_y, record.fl_z],
        rotation: [record.fl_qx, record.fl_qy, record.fl_qz, record.fl_qw],
    })
}

pub fn encode_placement(placement: &Placement) -> String {
    let header = CodeHeader {
        b_version: CODE_VERSION,
        b_kind: CODE_KIND_PLACEMENT,
        w_count: 1,
    };
    let record = PlacementRecord {
        fl_x: placement.position[0],
        fl_y: placement.position[1],
        fl_z: placement.position[2],
        fl_qx: placement.rotation[0],
        fl_qy: placement.rotation[1],
        fl_qz: placement.rotation[2],
        fl_qw: placement.rotation[3],
    };

    let mut bytes = Vec::with_capacity(std::mem::size_of::<CodeHeader>() + std::mem::size_of::<PlacementRecord>());
    bytes.extend_from_slice(bytemuck::bytes_of(&header));
    bytes.extend_from_slice(bytemuck::bytes_of(&record));

    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placement_survives_encoding() {
        let placement = Placement {
            position: [0.01, -0.055, 0.002],
            rotation: [0.0, 0.7071, 0.0, 0.7071],
        };
        let code = encode_placement(&placement);
        assert_eq!(decode_placement(&code).unwrap(), placement);
    }

    #[test]
    fn environment_survives_encoding() {
        let environment = Environment {
            markers: vec![[-0.3, 0.0, -0.3], [0.3, 0.0, -0.3], [0.0, 0.0, 0.4]],
        };
        let code = encode_environment(&environment).unwrap();
        let decoded = decode_environment(&code).unwrap();
        assert_eq!(decoded.markers.len(), 3);
        assert_eq!(decoded, environment);
    }

    #[test]
    fn environment_code_rejected_as_placement() {
        let environment = Environment {
            markers: vec![[0.0, 0.0, 0.0]],
        };
        let code = encode_environment(&environment).unwrap();
        match decode_placement(&code) {
            Err(Error::UnexpectedCodeKind(kind)) => assert_eq!(kind, CODE_KIND_ENVIRONMENT),
            other => panic!("expected UnexpectedCodeKind, got {other:?}"),
        }
    }

    #[test]
    fn truncated_code_is_rejected() {
        let environment = Environment {
            markers: vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]],
        };
        let code = encode_environment(&environment).unwrap();
        let bytes = URL_SAFE_NO_PAD.decode(code).unwrap();
        let truncated = URL_SAFE_NO_PAD.encode(&bytes[..bytes.len() - 4]);
        assert!(matches!(
            decode_environment(&truncated),
            Err(Error::CodeTooShort { .. })
        ));
    }

    #[test]
    fn empty_environment_is_rejected() {
        let header = CodeHeader {
            b_version: CODE_VERSION,
            b_kind: CODE_KIND_ENVIRONMENT,
            w_count: 0,
        };
        let code = URL_SAFE_NO_PAD.encode(bytemuck::bytes_of(&header));
        assert!(matches!(
            decode_environment(&code),
            Err(Error::EmptyEnvironment)
        ));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let header = CodeHeader {
            b_version: 0x7f,
            b_kind: CODE_KIND_PLACEMENT,
            w_count: 1,
        };
        let code = URL_SAFE_NO_PAD.encode(bytemuck::bytes_of(&header));
        assert!(matches!(
            decode_placement(&code),
            Err(Error::UnsupportedCodeVersion(0x7f))
        ));
    }

    #[test]
    fn garbage_text_is_rejected() {
        assert!(matches!(
            decode_environment("not!valid!base64!"),
            Err(Error::Base64(_))
        ));
    }
}
