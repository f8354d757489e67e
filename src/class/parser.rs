use std::sync::Arc;

use cesu8_str::java as cesu8_java;
use nom::{Parser, multi::count};

use super::{
    AttributeInfo, BootstrapMethod, ClassFile, CodeAttribute, ConstantPool, ConstantPoolInfo,
    ExceptionTableItem, FieldInfo, LineNumberTableItem, MethodInfo, ParseResult, fail,
    reader::{read_bytes, read_u1, read_u2, read_u4},
};
use crate::{
    consts::{CLASS_FILE_MAGIC, ClassAccessFlag, FieldAccessFlag, MethodAccessFlag},
    error::FormatError,
};

pub fn class_file(input: &[u8]) -> Result<ClassFile, FormatError> {
    let (input, (minor, major)) = parse_header(input)?;
    let (input, constant_pool) = parse_constant_pool(input)?;

    let (input, access_flags) = read_u2(input)?;
    let (input, this_class) = read_u2(input)?;
    let (input, super_class) = read_u2(input)?;
    let (input, interfaces) = parse_interfaces(input)?;
    let (input, fields) = parse_fields(input, &constant_pool)?;
    let (input, methods) = parse_methods(input, &constant_pool)?;
    let (input, attributes) = parse_attributes(input, &constant_pool)?;

    if !input.is_empty() {
        return Err(FormatError::TrailingBytes(input.len()));
    }

    Ok(ClassFile {
        major_version: major,
        minor_version: minor,
        access_flags: ClassAccessFlag::from_bits_retain(access_flags),
        this_class,
        super_class,
        constant_pool,
        interfaces,
        fields,
        methods,
        attributes,
    })
}

fn parse_header(input: &[u8]) -> ParseResult<'_, (u16, u16)> {
    let (input, magic) = read_u4(input)?;
    if magic != CLASS_FILE_MAGIC {
        return fail(FormatError::BadMagic(magic));
    }
    let (input, minor) = read_u2(input)?;
    let (input, major) = read_u2(input)?;
    Ok((input, (minor, major)))
}

fn parse_constant_pool(input: &[u8]) -> ParseResult<'_, ConstantPool> {
    let (mut input, constant_pool_count) = read_u2(input)?;
    if constant_pool_count == 0 {
        return fail(FormatError::EmptyConstantPool);
    }

    let mut constant_pool = Vec::with_capacity(constant_pool_count as usize);
    constant_pool.push(ConstantPoolInfo::Empty);

    while constant_pool.len() < constant_pool_count as usize {
        let index = constant_pool.len() as u16;
        let constant;
        (input, constant) = parse_constant(input, index)?;
        log::trace!("#{index} = {constant:?}");
        let need_empty = constant.is_wide();
        constant_pool.push(constant);
        if need_empty {
            // the second slot of a long or double must still be inside the pool
            if constant_pool.len() == constant_pool_count as usize {
                return fail(FormatError::BadConstantIndex(index + 1));
            }
            constant_pool.push(ConstantPoolInfo::Empty);
        }
    }

    Ok((input, ConstantPool::new(constant_pool)))
}

fn parse_constant(mut input: &[u8], index: u16) -> ParseResult<'_, ConstantPoolInfo> {
    let tag;
    (input, tag) = read_u1(input)?;
    let cp_info = match tag {
        ConstantPoolInfo::UTF8 => {
            let (length, bytes);
            (input, length) = read_u2(input)?;
            (input, bytes) = read_bytes(input, length as usize)?;
            match decode_utf8(bytes) {
                Some(value) => ConstantPoolInfo::Utf8(value),
                None => return fail(FormatError::InvalidUtf8(index)),
            }
        }
        ConstantPoolInfo::INTEGER => {
            let bytes;
            (input, bytes) = read_u4(input)?;
            ConstantPoolInfo::Integer(bytes.to_be_bytes())
        }
        ConstantPoolInfo::FLOAT => {
            let bytes;
            (input, bytes) = read_u4(input)?;
            ConstantPoolInfo::Float(bytes.to_be_bytes())
        }
        ConstantPoolInfo::LONG => {
            let (high_bytes, low_bytes);
            (input, high_bytes) = read_u4(input)?;
            (input, low_bytes) = read_u4(input)?;
            ConstantPoolInfo::Long {
                high_bytes,
                low_bytes,
            }
        }
        ConstantPoolInfo::DOUBLE => {
            let (high_bytes, low_bytes);
            (input, high_bytes) = read_u4(input)?;
            (input, low_bytes) = read_u4(input)?;
            ConstantPoolInfo::Double {
                high_bytes,
                low_bytes,
            }
        }
        ConstantPoolInfo::CLASS => {
            let name_index;
            (input, name_index) = read_u2(input)?;
            ConstantPoolInfo::Class { name_index }
        }
        ConstantPoolInfo::STRING => {
            let string_index;
            (input, string_index) = read_u2(input)?;
            ConstantPoolInfo::String { string_index }
        }
        ConstantPoolInfo::FIELDREF => {
            let (class_index, name_and_type_index);
            (input, class_index) = read_u2(input)?;
            (input, name_and_type_index) = read_u2(input)?;
            ConstantPoolInfo::Fieldref {
                class_index,
                name_and_type_index,
            }
        }
        ConstantPoolInfo::METHODREF => {
            let (class_index, name_and_type_index);
            (input, class_index) = read_u2(input)?;
            (input, name_and_type_index) = read_u2(input)?;
            ConstantPoolInfo::Methodref {
                class_index,
                name_and_type_index,
            }
        }
        ConstantPoolInfo::INTERFACE_METHODREF => {
            let (class_index, name_and_type_index);
            (input, class_index) = read_u2(input)?;
            (input, name_and_type_index) = read_u2(input)?;
            ConstantPoolInfo::InterfaceMethodref {
                class_index,
                name_and_type_index,
            }
        }
        ConstantPoolInfo::NAME_AND_TYPE => {
            let (name_index, descriptor_index);
            (input, name_index) = read_u2(input)?;
            (input, descriptor_index) = read_u2(input)?;
            ConstantPoolInfo::NameAndType {
                name_index,
                descriptor_index,
            }
        }
        ConstantPoolInfo::METHOD_HANDLE => {
            let (reference_kind, reference_index);
            (input, reference_kind) = read_u1(input)?;
            (input, reference_index) = read_u2(input)?;
            ConstantPoolInfo::MethodHandle {
                reference_kind,
                reference_index,
            }
        }
        ConstantPoolInfo::METHOD_TYPE => {
            let descriptor_index;
            (input, descriptor_index) = read_u2(input)?;
            ConstantPoolInfo::MethodType { descriptor_index }
        }
        ConstantPoolInfo::DYNAMIC => {
            let (bootstrap_method_attr_index, name_and_type_index);
            (input, bootstrap_method_attr_index) = read_u2(input)?;
            (input, name_and_type_index) = read_u2(input)?;
            ConstantPoolInfo::Dynamic {
                bootstrap_method_attr_index,
                name_and_type_index,
            }
        }
        ConstantPoolInfo::INVOKE_DYNAMIC => {
            let (bootstrap_method_attr_index, name_and_type_index);
            (input, bootstrap_method_attr_index) = read_u2(input)?;
            (input, name_and_type_index) = read_u2(input)?;
            ConstantPoolInfo::InvokeDynamic {
                bootstrap_method_attr_index,
                name_and_type_index,
            }
        }
        ConstantPoolInfo::MODULE => {
            let name_index;
            (input, name_index) = read_u2(input)?;
            ConstantPoolInfo::Module { name_index }
        }
        ConstantPoolInfo::PACKAGE => {
            let name_index;
            (input, name_index) = read_u2(input)?;
            ConstantPoolInfo::Package { name_index }
        }
        _ => {
            return fail(FormatError::UnknownConstantTag { index, tag });
        }
    };
    Ok((input, cp_info))
}

/// Class files store text as "modified UTF-8".
fn decode_utf8(bytes: &[u8]) -> Option<Arc<str>> {
    let java_str = cesu8_java::JavaStr::from_java_cesu8(bytes).ok()?;
    Some(Arc::from(cesu8_java::from_java_cesu8(java_str)))
}

fn parse_interfaces(input: &[u8]) -> ParseResult<'_, Vec<u16>> {
    let (input, interface_count) = read_u2(input)?;

    let (input, interfaces) = count(read_u2, interface_count as usize).parse(input)?;

    Ok((input, interfaces))
}

fn parse_fields<'a>(input: &'a [u8], pool: &ConstantPool) -> ParseResult<'a, Vec<FieldInfo>> {
    let (input, field_count) = read_u2(input)?;
    count(|input| parse_field(input, pool), field_count as usize).parse(input)
}

fn parse_field<'a>(input: &'a [u8], pool: &ConstantPool) -> ParseResult<'a, FieldInfo> {
    let (input, access_flags) = read_u2(input)?;
    let (input, name_index) = read_u2(input)?;
    let (input, descriptor_index) = read_u2(input)?;

    let (input, attributes) = parse_attributes(input, pool)?;
    Ok((
        input,
        FieldInfo {
            access_flags: FieldAccessFlag::from_bits_retain(access_flags),
            name_index,
            descriptor_index,
            attributes,
        },
    ))
}

fn parse_methods<'a>(input: &'a [u8], pool: &ConstantPool) -> ParseResult<'a, Vec<MethodInfo>> {
    let (input, methods_count) = read_u2(input)?;
    count(|input| parse_method(input, pool), methods_count as usize).parse(input)
}

fn parse_method<'a>(input: &'a [u8], pool: &ConstantPool) -> ParseResult<'a, MethodInfo> {
    let (input, access_flags) = read_u2(input)?;
    let (input, name_index) = read_u2(input)?;
    let name = pool.utf8(name_index).map_err(nom::Err::Failure)?;
    let (input, descriptor_index) = read_u2(input)?;
    let descriptor = pool.utf8(descriptor_index).map_err(nom::Err::Failure)?;
    let (input, attributes) = parse_attributes(input, pool)?;

    let code = attributes
        .iter()
        .find_map(|attribute| match attribute {
            AttributeInfo::Code(code) => Some(Arc::clone(&code.code)),
            _ => None,
        })
        .unwrap_or_else(|| Arc::from(Vec::new()));

    Ok((
        input,
        MethodInfo {
            access_flags: MethodAccessFlag::from_bits_retain(access_flags),
            name: Arc::clone(name),
            name_index,
            descriptor: Arc::clone(descriptor),
            descriptor_index,
            attributes,
            code,
        },
    ))
}

fn parse_attributes<'a>(
    input: &'a [u8],
    pool: &ConstantPool,
) -> ParseResult<'a, Vec<AttributeInfo>> {
    let (input, attributes_count) = read_u2(input)?;
    count(|input| parse_attribute(input, pool), attributes_count as usize).parse(input)
}

fn parse_attribute<'a>(input: &'a [u8], pool: &ConstantPool) -> ParseResult<'a, AttributeInfo> {
    let (input, attribute_name_index) = read_u2(input)?;
    let (input, attribute_length) = read_u4(input)?;
    let attribute_name = pool.utf8(attribute_name_index).map_err(nom::Err::Failure)?;
    let (input, info) = read_bytes(input, attribute_length as usize)?;
    log::trace!("attribute {attribute_name} ({attribute_length} bytes)");

    let attribute_info = match &**attribute_name {
        AttributeInfo::CONSTANT_VALUE => {
            let constant_value_index = parse_body(attribute_name, info, read_u2)?;
            AttributeInfo::ConstantValue {
                constant_value_index,
            }
        }
        AttributeInfo::CODE => {
            AttributeInfo::Code(parse_body(attribute_name, info, |body| parse_code(body, pool))?)
        }
        AttributeInfo::BOOTSTRAP_METHODS => AttributeInfo::BootstrapMethods(parse_body(
            attribute_name,
            info,
            parse_bootstrap_methods,
        )?),
        AttributeInfo::SOURCE_FILE => {
            let sourcefile_index = parse_body(attribute_name, info, read_u2)?;
            let sourcefile = pool.utf8(sourcefile_index).map_err(nom::Err::Failure)?;
            AttributeInfo::SourceFile(Arc::clone(sourcefile))
        }
        AttributeInfo::LINE_NUMBER_TABLE => AttributeInfo::LineNumberTable(parse_body(
            attribute_name,
            info,
            parse_line_number_table,
        )?),
        _ => AttributeInfo::Unknown {
            name: Arc::clone(attribute_name),
            length: attribute_length,
            info: info.to_vec(),
        },
    };

    Ok((input, attribute_info))
}

/// Runs `parser` over the declared body of an attribute, which it must
/// consume exactly.
fn parse_body<'a, T>(
    name: &str,
    body: &'a [u8],
    mut parser: impl FnMut(&'a [u8]) -> ParseResult<'a, T>,
) -> Result<T, nom::Err<FormatError>> {
    let length_mismatch = || {
        nom::Err::Failure(FormatError::AttributeLength {
            name: name.to_string(),
            declared: body.len() as u32,
        })
    };
    match parser(body) {
        Ok(([], value)) => Ok(value),
        Ok(_) | Err(nom::Err::Failure(FormatError::UnexpectedEof { .. })) => Err(length_mismatch()),
        Err(err) => Err(err),
    }
}

fn parse_code<'a>(input: &'a [u8], pool: &ConstantPool) -> ParseResult<'a, CodeAttribute> {
    let (input, max_stack) = read_u2(input)?;
    let (input, max_locals) = read_u2(input)?;

    let (input, code_length) = read_u4(input)?;
    let (input, code) = read_bytes(input, code_length as usize)?;

    let (input, exception_table_length) = read_u2(input)?;
    let (input, exception_table) =
        count(parse_exception_table, exception_table_length as usize).parse(input)?;

    let (input, attributes) = parse_attributes(input, pool)?;

    Ok((
        input,
        CodeAttribute {
            max_stack,
            max_locals,
            code: Arc::from(code),
            exception_table,
            attributes,
        },
    ))
}

fn parse_exception_table(input: &[u8]) -> ParseResult<'_, ExceptionTableItem> {
    let (input, start_pc) = read_u2(input)?;
    let (input, end_pc) = read_u2(input)?;
    let (input, handler_pc) = read_u2(input)?;
    let (input, catch_type) = read_u2(input)?;

    Ok((
        input,
        ExceptionTableItem {
            start_pc,
            end_pc,
            handler_pc,
            catch_type,
        },
    ))
}

fn parse_bootstrap_methods(input: &[u8]) -> ParseResult<'_, Vec<BootstrapMethod>> {
    let (input, num_bootstrap_methods) = read_u2(input)?;
    count(
        |input| {
            let (input, bootstrap_method_ref) = read_u2(input)?;
            let (input, num_bootstrap_arguments) = read_u2(input)?;
            let (input, bootstrap_arguments) =
                count(read_u2, num_bootstrap_arguments as usize).parse(input)?;
            Ok((
                input,
                BootstrapMethod {
                    bootstrap_method_ref,
                    bootstrap_arguments,
                },
            ))
        },
        num_bootstrap_methods as usize,
    )
    .parse(input)
}

fn parse_line_number_table(input: &[u8]) -> ParseResult<'_, Vec<LineNumberTableItem>> {
    let (input, line_number_table_length) = read_u2(input)?;
    count(
        |input| {
            let (input, start_pc) = read_u2(input)?;
            let (input, line_number) = read_u2(input)?;
            Ok((
                input,
                LineNumberTableItem {
                    start_pc,
                    line_number,
                },
            ))
        },
        line_number_table_length as usize,
    )
    .parse(input)
}
