use std::sync::Arc;

use crate::error::FormatError;

/// One constant pool entry as it appears in the class file.
///
/// Entries only ever refer to each other by index; following those indices is
/// the job of the resolver methods on [`ConstantPool`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantPoolInfo {
    Utf8(Arc<str>),
    Integer([u8; 4]),
    Float([u8; 4]),
    Long {
        high_bytes: u32,
        low_bytes: u32,
    },
    Double {
        high_bytes: u32,
        low_bytes: u32,
    },
    Class {
        name_index: u16,
    },
    String {
        string_index: u16,
    },
    Fieldref {
        class_index: u16,
        name_and_type_index: u16,
    },
    Methodref {
        class_index: u16,
        name_and_type_index: u16,
    },
    InterfaceMethodref {
        class_index: u16,
        name_and_type_index: u16,
    },
    NameAndType {
        name_index: u16,
        descriptor_index: u16,
    },
    MethodHandle {
        reference_kind: u8,
        reference_index: u16,
    },
    MethodType {
        descriptor_index: u16,
    },
    Dynamic {
        bootstrap_method_attr_index: u16,
        name_and_type_index: u16,
    },
    InvokeDynamic {
        bootstrap_method_attr_index: u16,
        name_and_type_index: u16,
    },
    Module {
        name_index: u16,
    },
    Package {
        name_index: u16,
    },
    /// Slot 0 and the slot following a long or double.
    Empty,
}

impl ConstantPoolInfo {
    pub const UTF8: u8 = 1;
    pub const INTEGER: u8 = 3;
    pub const FLOAT: u8 = 4;
    pub const LONG: u8 = 5;
    pub const DOUBLE: u8 = 6;
    pub const CLASS: u8 = 7;
    pub const STRING: u8 = 8;
    pub const FIELDREF: u8 = 9;
    pub const METHODREF: u8 = 10;
    pub const INTERFACE_METHODREF: u8 = 11;
    pub const NAME_AND_TYPE: u8 = 12;
    pub const METHOD_HANDLE: u8 = 15;
    pub const METHOD_TYPE: u8 = 16;
    pub const DYNAMIC: u8 = 17;
    pub const INVOKE_DYNAMIC: u8 = 18;
    pub const MODULE: u8 = 19;
    pub const PACKAGE: u8 = 20;

    /// Name of the entry kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            ConstantPoolInfo::Utf8(_) => "Utf8",
            ConstantPoolInfo::Integer(_) => "Integer",
            ConstantPoolInfo::Float(_) => "Float",
            ConstantPoolInfo::Long { .. } => "Long",
            ConstantPoolInfo::Double { .. } => "Double",
            ConstantPoolInfo::Class { .. } => "Class",
            ConstantPoolInfo::String { .. } => "String",
            ConstantPoolInfo::Fieldref { .. } => "Fieldref",
            ConstantPoolInfo::Methodref { .. } => "Methodref",
            ConstantPoolInfo::InterfaceMethodref { .. } => "InterfaceMethodref",
            ConstantPoolInfo::NameAndType { .. } => "NameAndType",
            ConstantPoolInfo::MethodHandle { .. } => "MethodHandle",
            ConstantPoolInfo::MethodType { .. } => "MethodType",
            ConstantPoolInfo::Dynamic { .. } => "Dynamic",
            ConstantPoolInfo::InvokeDynamic { .. } => "InvokeDynamic",
            ConstantPoolInfo::Module { .. } => "Module",
            ConstantPoolInfo::Package { .. } => "Package",
            ConstantPoolInfo::Empty => "Empty",
        }
    }

    /// Error for this entry sitting at `index` where `expected` was required.
    pub(crate) fn mismatch(&self, index: u16, expected: &'static str) -> FormatError {
        FormatError::ConstantMismatch {
            index,
            expected,
            found: self.kind(),
        }
    }

    /// Long and double entries take up two pool slots.
    pub fn is_wide(&self) -> bool {
        matches!(
            self,
            ConstantPoolInfo::Long { .. } | ConstantPoolInfo::Double { .. }
        )
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            ConstantPoolInfo::Integer(bytes) => Some(i32::from_be_bytes(*bytes)),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            ConstantPoolInfo::Float(bytes) => Some(f32::from_be_bytes(*bytes)),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match *self {
            ConstantPoolInfo::Long {
                high_bytes,
                low_bytes,
            } => Some(join_words(high_bytes, low_bytes) as i64),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match *self {
            ConstantPoolInfo::Double {
                high_bytes,
                low_bytes,
            } => Some(f64::from_bits(join_words(high_bytes, low_bytes))),
            _ => None,
        }
    }
}

fn join_words(high: u32, low: u32) -> u64 {
    ((high as u64) << 32) | low as u64
}

/// The decoded, immutable constant pool of one class.
///
/// Indices are 1-based as in the class file; slot 0 is reserved.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantPool {
    entries: Vec<ConstantPoolInfo>,
}

impl ConstantPool {
    /// `entries[0]` must be the reserved [`ConstantPoolInfo::Empty`] slot.
    pub(crate) fn new(entries: Vec<ConstantPoolInfo>) -> Self {
        debug_assert!(matches!(entries.first(), Some(ConstantPoolInfo::Empty)));
        Self { entries }
    }

    /// The `constant_pool_count` this pool was decoded from.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, index: u16) -> Result<&ConstantPoolInfo, FormatError> {
        match self.entries.get(index as usize) {
            None | Some(ConstantPoolInfo::Empty) => Err(FormatError::BadConstantIndex(index)),
            Some(constant) => Ok(constant),
        }
    }

    pub fn utf8(&self, index: u16) -> Result<&Arc<str>, FormatError> {
        match self.get(index)? {
            ConstantPoolInfo::Utf8(value) => Ok(value),
            other => Err(other.mismatch(index, "Utf8")),
        }
    }

    /// Usable entries with their indices, skipping reserved slots.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &ConstantPoolInfo)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, constant)| !matches!(constant, ConstantPoolInfo::Empty))
            .map(|(index, constant)| (index as u16, constant))
    }
}
