use std::{io::Read, sync::Arc};

mod attributes;
mod constant_pool;

pub use attributes::*;
pub use constant_pool::*;

use crate::{
    class::parser,
    consts::{ClassAccessFlag, FieldAccessFlag, MethodAccessFlag},
    descriptor::{FieldDescriptor, FieldType, parse_field_descriptor},
    error::{Error, FormatError, Result},
};

/// A fully decoded class file. Never mutated after decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassFile {
    pub minor_version: u16,
    pub major_version: u16,
    pub constant_pool: ConstantPool,
    pub access_flags: ClassAccessFlag,
    pub this_class: u16,
    pub super_class: u16,
    pub interfaces: Vec<u16>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
    pub attributes: Vec<AttributeInfo>,
}

impl ClassFile {
    pub fn parse(input: &[u8]) -> Result<Self> {
        Ok(parser::class_file(input)?)
    }

    /// Drains `reader` and decodes what it produced.
    pub fn read_from(mut reader: impl Read) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::parse(&bytes)
    }

    pub fn class_name(&self) -> Result<String> {
        Ok(self.constant_pool.class_name(self.this_class)?)
    }

    /// `None` for `java.lang.Object`, which has no super class.
    pub fn super_class_name(&self) -> Result<Option<String>> {
        if self.super_class == 0 {
            return Ok(None);
        }
        Ok(Some(self.constant_pool.class_name(self.super_class)?))
    }

    pub fn interface_names(&self) -> Result<Vec<String>> {
        self.interfaces
            .iter()
            .map(|&index| Ok(self.constant_pool.class_name(index)?))
            .collect()
    }

    pub fn find_method(&self, name: &str) -> Result<&MethodInfo> {
        self.methods
            .iter()
            .find(|method| &*method.name == name)
            .ok_or_else(|| Error::MethodNotFound(name.to_string()))
    }

    pub fn find_method_by_descriptor(&self, name: &str, descriptor: &str) -> Result<&MethodInfo> {
        self.methods
            .iter()
            .find(|method| &*method.name == name && &*method.descriptor == descriptor)
            .ok_or_else(|| Error::MethodNotFound(format!("{name}{descriptor}")))
    }

    pub fn bootstrap_methods(&self) -> &[BootstrapMethod] {
        self.attributes
            .iter()
            .find_map(|attribute| match attribute {
                AttributeInfo::BootstrapMethods(methods) => Some(methods.as_slice()),
                _ => None,
            })
            .unwrap_or_default()
    }

    pub fn source_file(&self) -> Option<&str> {
        self.attributes.iter().find_map(|attribute| match attribute {
            AttributeInfo::SourceFile(name) => Some(&**name),
            _ => None,
        })
    }
}

/// Fields keep their name and descriptor as pool indices; see
/// [`FieldInfo::name`] and [`FieldInfo::descriptor`].
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    pub access_flags: FieldAccessFlag,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Vec<AttributeInfo>,
}

impl FieldInfo {
    pub fn name<'p>(&self, pool: &'p ConstantPool) -> std::result::Result<&'p str, FormatError> {
        pool.utf8(self.name_index).map(|name| &**name)
    }

    pub fn descriptor<'p>(&self, pool: &'p ConstantPool) -> std::result::Result<&'p str, FormatError> {
        pool.utf8(self.descriptor_index).map(|descriptor| &**descriptor)
    }

    pub fn field_type(&self, pool: &ConstantPool) -> std::result::Result<FieldType, FormatError> {
        let descriptor = self.descriptor(pool)?;
        parse_field_descriptor(descriptor)
            .map(|(_, FieldDescriptor(field_type))| field_type)
            .map_err(|_| FormatError::InvalidDescriptor(descriptor.to_string()))
    }

    pub fn constant_value_index(&self) -> Option<u16> {
        self.attributes.iter().find_map(|attribute| match attribute {
            AttributeInfo::ConstantValue {
                constant_value_index,
            } => Some(*constant_value_index),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodInfo {
    pub access_flags: MethodAccessFlag,
    pub name: Arc<str>,
    pub name_index: u16,
    pub descriptor: Arc<str>,
    pub descriptor_index: u16,
    pub attributes: Vec<AttributeInfo>,
    /// Bytes of the `Code` attribute, empty for abstract and native methods.
    pub code: Arc<[u8]>,
}

impl MethodInfo {
    pub fn code_attribute(&self) -> Option<&CodeAttribute> {
        self.attributes.iter().find_map(|attribute| match attribute {
            AttributeInfo::Code(code) => Some(code),
            _ => None,
        })
    }
}
