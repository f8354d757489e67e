//! Following pool indices to symbolic references.
//!
//! Nothing is cached: every call walks the pool again, which is cheap and
//! keeps the pool itself read-only.

use std::{fmt, sync::Arc};

use super::{ConstantPool, ConstantPoolInfo};
use crate::{
    descriptor::{FieldType, MethodDescriptor, parse_method_descriptor},
    error::FormatError,
};

/// A resolved `Fieldref`, with the owning class in dotted form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    pub class: String,
    pub name: Arc<str>,
    pub descriptor: Arc<str>,
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} {}", self.class, self.name, self.descriptor)
    }
}

/// A resolved `Methodref` or `InterfaceMethodref`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodRef {
    pub class: String,
    pub name: Arc<str>,
    pub descriptor: Arc<str>,
    /// Dotted names of the object-typed parameters, in declaration order.
    /// Primitive and array parameters are not listed.
    pub arg_types: Vec<String>,
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} {:?}", self.class, self.name, self.arg_types)
    }
}

pub(crate) fn to_dotted(internal_name: &str) -> String {
    internal_name.replace('/', ".")
}

impl ConstantPool {
    /// Name of a `Class` entry, `/` separators replaced by `.`.
    pub fn class_name(&self, index: u16) -> Result<String, FormatError> {
        match *self.get(index)? {
            ConstantPoolInfo::Class { name_index } => Ok(to_dotted(self.utf8(name_index)?)),
            ref other => Err(other.mismatch(index, "Class")),
        }
    }

    pub fn string(&self, index: u16) -> Result<&Arc<str>, FormatError> {
        match *self.get(index)? {
            ConstantPoolInfo::String { string_index } => self.utf8(string_index),
            ref other => Err(other.mismatch(index, "String")),
        }
    }

    /// `(name, descriptor)` of a `NameAndType` entry.
    pub fn name_and_type(&self, index: u16) -> Result<(&Arc<str>, &Arc<str>), FormatError> {
        match *self.get(index)? {
            ConstantPoolInfo::NameAndType {
                name_index,
                descriptor_index,
            } => Ok((self.utf8(name_index)?, self.utf8(descriptor_index)?)),
            ref other => Err(other.mismatch(index, "NameAndType")),
        }
    }

    pub fn field_ref(&self, index: u16) -> Result<FieldRef, FormatError> {
        let (class_index, name_and_type_index) = match *self.get(index)? {
            ConstantPoolInfo::Fieldref {
                class_index,
                name_and_type_index,
            } => (class_index, name_and_type_index),
            ref other => return Err(other.mismatch(index, "Fieldref")),
        };
        let (name, descriptor) = self.name_and_type(name_and_type_index)?;
        Ok(FieldRef {
            class: self.class_name(class_index)?,
            name: Arc::clone(name),
            descriptor: Arc::clone(descriptor),
        })
    }

    pub fn method_ref(&self, index: u16) -> Result<MethodRef, FormatError> {
        let (class_index, name_and_type_index) = match *self.get(index)? {
            ConstantPoolInfo::Methodref {
                class_index,
                name_and_type_index,
            }
            | ConstantPoolInfo::InterfaceMethodref {
                class_index,
                name_and_type_index,
            } => (class_index, name_and_type_index),
            ref other => return Err(other.mismatch(index, "Methodref")),
        };
        let (name, descriptor) = self.name_and_type(name_and_type_index)?;
        let (_, parsed) = parse_method_descriptor(descriptor)
            .map_err(|_| FormatError::InvalidDescriptor(descriptor.to_string()))?;
        Ok(MethodRef {
            class: self.class_name(class_index)?,
            name: Arc::clone(name),
            descriptor: Arc::clone(descriptor),
            arg_types: object_arg_types(&parsed),
        })
    }
}

fn object_arg_types(descriptor: &MethodDescriptor) -> Vec<String> {
    descriptor
        .parameters
        .iter()
        .filter_map(|parameter| match parameter {
            FieldType::Object(class_name) => Some(to_dotted(class_name)),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf8(s: &str) -> ConstantPoolInfo {
        ConstantPoolInfo::Utf8(Arc::from(s))
    }

    /// Pool laid out the way javac emits `System.out.println("Hello, World!")`.
    fn hello_pool() -> ConstantPool {
        ConstantPool::new(vec![
            ConstantPoolInfo::Empty,
            // #1 Fieldref System.out
            ConstantPoolInfo::Fieldref {
                class_index: 2,
                name_and_type_index: 4,
            },
            ConstantPoolInfo::Class { name_index: 3 },
            utf8("java/lang/System"),
            ConstantPoolInfo::NameAndType {
                name_index: 5,
                descriptor_index: 6,
            },
            utf8("out"),
            utf8("Ljava/io/PrintStream;"),
            // #7 String "Hello, World!"
            ConstantPoolInfo::String { string_index: 8 },
            utf8("Hello, World!"),
            // #9 Methodref PrintStream.println
            ConstantPoolInfo::Methodref {
                class_index: 10,
                name_and_type_index: 12,
            },
            ConstantPoolInfo::Class { name_index: 11 },
            utf8("java/io/PrintStream"),
            ConstantPoolInfo::NameAndType {
                name_index: 13,
                descriptor_index: 14,
            },
            utf8("println"),
            utf8("(Ljava/lang/String;)V"),
            // #15 Methodref with a malformed descriptor
            ConstantPoolInfo::Methodref {
                class_index: 10,
                name_and_type_index: 16,
            },
            ConstantPoolInfo::NameAndType {
                name_index: 13,
                descriptor_index: 17,
            },
            utf8("(Ljava/lang/String"),
        ])
    }

    #[test]
    fn test_class_name_is_dotted() {
        assert_eq!(hello_pool().class_name(2).unwrap(), "java.lang.System");
    }

    #[test]
    fn test_field_ref() {
        let field = hello_pool().field_ref(1).unwrap();
        assert_eq!(field.class, "java.lang.System");
        assert_eq!(&*field.name, "out");
        assert_eq!(&*field.descriptor, "Ljava/io/PrintStream;");
    }

    #[test]
    fn test_method_ref_arg_types() {
        let method = hello_pool().method_ref(9).unwrap();
        assert_eq!(method.class, "java.io.PrintStream");
        assert_eq!(&*method.name, "println");
        assert_eq!(method.arg_types, vec!["java.lang.String".to_string()]);
    }

    #[test]
    fn test_string() {
        assert_eq!(&**hello_pool().string(7).unwrap(), "Hello, World!");
    }

    #[test]
    fn test_wrong_kind() {
        let pool = hello_pool();
        assert_eq!(
            pool.field_ref(9),
            Err(FormatError::ConstantMismatch {
                index: 9,
                expected: "Fieldref",
                found: "Methodref",
            })
        );
        assert_eq!(
            pool.string(8),
            Err(FormatError::ConstantMismatch {
                index: 8,
                expected: "String",
                found: "Utf8",
            })
        );
        assert_eq!(pool.class_name(0), Err(FormatError::BadConstantIndex(0)));
    }

    #[test]
    fn test_malformed_descriptor() {
        assert_eq!(
            hello_pool().method_ref(15),
            Err(FormatError::InvalidDescriptor("(Ljava/lang/String".to_string()))
        );
    }

    #[test]
    fn test_only_object_parameters_are_listed() {
        let descriptor = parse_method_descriptor("(I[Ljava/lang/Object;JLjava/util/List;)V")
            .unwrap()
            .1;
        assert_eq!(object_arg_types(&descriptor), vec!["java.util.List".to_string()]);
    }
}
