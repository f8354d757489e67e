use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeInfo {
    ConstantValue { constant_value_index: u16 },
    Code(CodeAttribute),
    BootstrapMethods(Vec<BootstrapMethod>),
    SourceFile(Arc<str>),
    LineNumberTable(Vec<LineNumberTableItem>),
    /// An attribute this reader does not interpret, kept byte for byte.
    Unknown {
        name: Arc<str>,
        length: u32,
        info: Vec<u8>,
    },
}

impl AttributeInfo {
    pub const CONSTANT_VALUE: &'static str = "ConstantValue";
    pub const CODE: &'static str = "Code";
    pub const BOOTSTRAP_METHODS: &'static str = "BootstrapMethods";
    pub const SOURCE_FILE: &'static str = "SourceFile";
    pub const LINE_NUMBER_TABLE: &'static str = "LineNumberTable";

    pub fn name(&self) -> &str {
        match self {
            AttributeInfo::ConstantValue { .. } => Self::CONSTANT_VALUE,
            AttributeInfo::Code(_) => Self::CODE,
            AttributeInfo::BootstrapMethods(_) => Self::BOOTSTRAP_METHODS,
            AttributeInfo::SourceFile(_) => Self::SOURCE_FILE,
            AttributeInfo::LineNumberTable(_) => Self::LINE_NUMBER_TABLE,
            AttributeInfo::Unknown { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Arc<[u8]>,
    pub exception_table: Vec<ExceptionTableItem>,
    pub attributes: Vec<AttributeInfo>,
}

impl CodeAttribute {
    /// Source line of the instruction at `pc`, from the nested line number table.
    pub fn line_number_for(&self, pc: u16) -> Option<u16> {
        self.attributes
            .iter()
            .filter_map(|attribute| match attribute {
                AttributeInfo::LineNumberTable(table) => Some(table),
                _ => None,
            })
            .flatten()
            .filter(|item| item.start_pc <= pc)
            .max_by_key(|item| item.start_pc)
            .map(|item| item.line_number)
    }
}

/// Handler ranges are not checked against the code length here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExceptionTableItem {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    pub catch_type: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapMethod {
    pub bootstrap_method_ref: u16,
    pub bootstrap_arguments: Vec<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineNumberTableItem {
    pub start_pc: u16,
    pub line_number: u16,
}
