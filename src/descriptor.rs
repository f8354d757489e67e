use std::fmt;

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::take_until,
    character::complete::{char, one_of},
    combinator::{eof, map},
    multi::many0,
    sequence::{delimited, preceded},
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDescriptor(pub FieldType);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub parameters: Vec<FieldType>,
    pub return_type: ReturnType,
}

/// `None` is `void`.
pub type ReturnType = Option<FieldType>;

#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum FieldType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    /// Internal (`/`-separated) class name.
    Object(String),
    Short,
    Boolean,
    Array(Box<FieldType>),
}

impl FieldType {
    /// The type as Java source spells it, e.g. `java.lang.String[]`.
    pub fn java_name(&self) -> String {
        match self {
            FieldType::Byte => "byte".to_string(),
            FieldType::Char => "char".to_string(),
            FieldType::Double => "double".to_string(),
            FieldType::Float => "float".to_string(),
            FieldType::Int => "int".to_string(),
            FieldType::Long => "long".to_string(),
            FieldType::Object(class_name) => class_name.replace('/', "."),
            FieldType::Short => "short".to_string(),
            FieldType::Boolean => "boolean".to_string(),
            FieldType::Array(element) => format!("{}[]", element.java_name()),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.java_name())
    }
}

pub fn parse_field_descriptor(input: &str) -> IResult<&str, FieldDescriptor> {
    let (input, field_type) = parse_field_type(input)?;
    let (input, _) = eof(input)?;
    Ok((input, FieldDescriptor(field_type)))
}

pub fn parse_method_descriptor(input: &str) -> IResult<&str, MethodDescriptor> {
    let (input, parameters) =
        delimited(char('('), many0(parse_field_type), char(')')).parse(input)?;

    let (input, return_type) = parse_return_type(input)?;

    let (input, _) = eof(input)?;
    Ok((
        input,
        MethodDescriptor {
            parameters,
            return_type,
        },
    ))
}

fn parse_return_type(input: &str) -> IResult<&str, ReturnType> {
    alt((map(parse_field_type, Some), map(char('V'), |_| None))).parse(input)
}

fn parse_field_type(input: &str) -> IResult<&str, FieldType> {
    alt((parse_base_type, parse_object_type, parse_array_type)).parse(input)
}

fn parse_base_type(input: &str) -> IResult<&str, FieldType> {
    let (input, ch) = one_of("BCDFIJSZ").parse(input)?;
    let field_type = match ch {
        'B' => FieldType::Byte,
        'C' => FieldType::Char,
        'D' => FieldType::Double,
        'F' => FieldType::Float,
        'I' => FieldType::Int,
        'J' => FieldType::Long,
        'S' => FieldType::Short,
        _ => FieldType::Boolean,
    };
    Ok((input, field_type))
}

/// `L<internal name>;`
fn parse_object_type(input: &str) -> IResult<&str, FieldType> {
    map(delimited(char('L'), take_until(";"), char(';')), |class_name: &str| {
        FieldType::Object(class_name.to_string())
    })
    .parse(input)
}

fn parse_array_type(input: &str) -> IResult<&str, FieldType> {
    map(preceded(char('['), parse_field_type), |element| {
        FieldType::Array(Box::new(element))
    })
    .parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_descriptor() {
        let (_, descriptor) = parse_method_descriptor("([Ljava/lang/String;)V").unwrap();
        assert_eq!(
            descriptor.parameters,
            vec![FieldType::Array(Box::new(FieldType::Object(
                "java/lang/String".to_string()
            )))]
        );
        assert_eq!(descriptor.return_type, None);
        assert_eq!(descriptor.parameters[0].java_name(), "java.lang.String[]");
    }

    #[test]
    fn test_mixed_parameters() {
        let (_, descriptor) = parse_method_descriptor("(IDLjava/lang/Thread;)Ljava/lang/Object;")
            .unwrap();
        assert_eq!(
            descriptor.parameters,
            vec![
                FieldType::Int,
                FieldType::Double,
                FieldType::Object("java/lang/Thread".to_string()),
            ]
        );
        assert_eq!(
            descriptor.return_type,
            Some(FieldType::Object("java/lang/Object".to_string()))
        );
    }

    #[test]
    fn test_field_descriptor() {
        let (_, FieldDescriptor(field_type)) = parse_field_descriptor("[[J").unwrap();
        assert_eq!(field_type.to_string(), "long[][]");
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(parse_method_descriptor("(Ljava/lang/String)V").is_err());
        assert!(parse_method_descriptor("()").is_err());
        assert!(parse_method_descriptor("()VV").is_err());
        assert!(parse_field_descriptor("V").is_err());
        assert!(parse_field_descriptor("IJ").is_err());
    }
}
