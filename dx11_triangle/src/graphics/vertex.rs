use bytemuck::{Pod, Zeroable};
use std::ffi::CStr;
use std::mem::{offset_of, size_of};

use super::BackendError;

/// 顶点属性的数值格式。每个分量都是 32 位浮点数。
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AttributeFormat {
    Float32x3,
    Float32x4,
}

impl AttributeFormat {
    pub const fn components(self) -> u32 {
        match self {
            AttributeFormat::Float32x3 => 3,
            AttributeFormat::Float32x4 => 4,
        }
    }

    pub const fn size(self) -> u32 {
        self.components() * size_of::<f32>() as u32
    }
}

/// 输入布局中的一个元素：语义名、在顶点结构体中的字节偏移以及格式。
/// 语义索引和输入槽始终为 0，逐顶点数据。
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct VertexAttribute {
    pub semantic: &'static CStr,
    pub offset: u32,
    pub format: AttributeFormat,
}

/// Vertex layout (28 bytes):
///
///  offset  0  position  [f32; 3]  POSITION
///  offset 12  color     [f32; 4]  COLOR
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex {
    /// 偏移量直接取自结构体本身，输入布局由它生成，两者不会各自漂移。
    pub const ATTRIBUTES: [VertexAttribute; 2] = [
        VertexAttribute {
            semantic: c"POSITION",
            offset: offset_of!(Vertex, position) as u32,
            format: AttributeFormat::Float32x3,
        },
        VertexAttribute {
            semantic: c"COLOR",
            offset: offset_of!(Vertex, color) as u32,
            format: AttributeFormat::Float32x4,
        },
    ];

    pub const STRIDE: u32 = size_of::<Vertex>() as u32;

    pub const fn new(position: [f32; 3], color: [f32; 4]) -> Self {
        Vertex { position, color }
    }
}

/// Top (red), right (green), left (blue).
pub const TRIANGLE: [Vertex; 3] = [
    Vertex::new([0.0, 0.5, 0.0], [1.0, 0.0, 0.0, 1.0]),
    Vertex::new([0.45, -0.5, 0.0], [0.0, 1.0, 0.0, 1.0]),
    Vertex::new([-0.45, -0.5, 0.0], [0.0, 0.0, 1.0, 1.0]),
];

/// 检查属性列表是否按偏移升序、彼此不重叠，并且恰好铺满 `stride` 字节。
pub fn validate_layout(attributes: &[VertexAttribute], stride: u32) -> Result<(), BackendError> {
    let mut cursor = 0;
    for attribute in attributes {
        let semantic = attribute.semantic.to_string_lossy().into_owned();
        if attribute.offset != cursor {
            return Err(BackendError::InvalidLayout {
                semantic,
                reason: format!("expected offset {cursor}, found {}", attribute.offset),
            });
        }
        cursor += attribute.format.size();
        if cursor > stride {
            return Err(BackendError::InvalidLayout {
                semantic,
                reason: format!("ends at byte {cursor}, past the {stride}-byte stride"),
            });
        }
    }
    if cursor != stride {
        return Err(BackendError::InvalidLayout {
            semantic: String::new(),
            reason: format!("attributes cover {cursor} of {stride} bytes"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_seven_packed_floats() {
        assert_eq!(Vertex::STRIDE, 28);
        assert_eq!(Vertex::ATTRIBUTES[0].offset, 0);
        assert_eq!(Vertex::ATTRIBUTES[1].offset, 12);
        assert_eq!(Vertex::ATTRIBUTES[1].format.components(), 4);
    }

    #[test]
    fn declared_layout_matches_struct() {
        validate_layout(&Vertex::ATTRIBUTES, Vertex::STRIDE).unwrap();
    }

    #[test]
    fn triangle_bytes_are_position_then_color() {
        let floats: &[f32] = bytemuck::cast_slice(&TRIANGLE);
        assert_eq!(floats.len(), 21);
        assert_eq!(&floats[..7], &[0.0, 0.5, 0.0, 1.0, 0.0, 0.0, 1.0]);
        assert_eq!(&floats[14..], &[-0.45, -0.5, 0.0, 0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn gap_in_layout_is_rejected() {
        let attributes = [
            VertexAttribute {
                semantic: c"POSITION",
                offset: 0,
                format: AttributeFormat::Float32x3,
            },
            VertexAttribute {
                semantic: c"COLOR",
                offset: 16,
                format: AttributeFormat::Float32x4,
            },
        ];
        let err = validate_layout(&attributes, 32).unwrap_err();
        assert!(matches!(err, BackendError::InvalidLayout { ref semantic, .. } if semantic == "COLOR"));
    }

    #[test]
    fn layout_shorter_than_stride_is_rejected() {
        let err = validate_layout(&Vertex::ATTRIBUTES[..1], Vertex::STRIDE).unwrap_err();
        assert!(matches!(err, BackendError::InvalidLayout { .. }));
    }

    #[test]
    fn layout_past_stride_is_rejected() {
        let err = validate_layout(&Vertex::ATTRIBUTES, 24).unwrap_err();
        assert!(matches!(err, BackendError::InvalidLayout { ref semantic, .. } if semantic == "COLOR"));
    }
}
