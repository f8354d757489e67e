//! Hand-assembles class files for the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;

pub const GETSTATIC: u8 = 0xb2;
pub const LDC: u8 = 0x12;
pub const INVOKEVIRTUAL: u8 = 0xb6;
pub const RETURN: u8 = 0xb1;

pub struct ClassBuilder {
    magic: u32,
    constants: Vec<Vec<u8>>,
    next_index: u16,
    utf8_indices: HashMap<String, u16>,
    interfaces: Vec<u16>,
    fields: Vec<Vec<u8>>,
    methods: Vec<Vec<u8>>,
    class_attributes: Vec<Vec<u8>>,
}

impl ClassBuilder {
    pub fn new() -> Self {
        Self {
            magic: 0xcafe_babe,
            constants: Vec::new(),
            next_index: 1,
            utf8_indices: HashMap::new(),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            class_attributes: Vec::new(),
        }
    }

    pub fn magic(mut self, magic: u32) -> Self {
        self.magic = magic;
        self
    }

    /// Appends an already encoded constant and returns its index.
    pub fn raw_constant(&mut self, bytes: Vec<u8>) -> u16 {
        let index = self.next_index;
        let wide = matches!(bytes.first(), Some(5 | 6));
        self.constants.push(bytes);
        self.next_index += if wide { 2 } else { 1 };
        index
    }

    pub fn utf8(&mut self, value: &str) -> u16 {
        if let Some(&index) = self.utf8_indices.get(value) {
            return index;
        }
        let mut bytes = vec![1];
        bytes.extend((value.len() as u16).to_be_bytes());
        bytes.extend(value.as_bytes());
        let index = self.raw_constant(bytes);
        self.utf8_indices.insert(value.to_string(), index);
        index
    }

    pub fn class(&mut self, name: &str) -> u16 {
        let name_index = self.utf8(name);
        self.raw_constant(with_u2s(7, &[name_index]))
    }

    pub fn string(&mut self, value: &str) -> u16 {
        let string_index = self.utf8(value);
        self.raw_constant(with_u2s(8, &[string_index]))
    }

    pub fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        self.raw_constant(with_u2s(12, &[name_index, descriptor_index]))
    }

    pub fn field_ref(&mut self, class: &str, name: &str, descriptor: &str) -> u16 {
        let class_index = self.class(class);
        let name_and_type_index = self.name_and_type(name, descriptor);
        self.raw_constant(with_u2s(9, &[class_index, name_and_type_index]))
    }

    pub fn method_ref(&mut self, class: &str, name: &str, descriptor: &str) -> u16 {
        let class_index = self.class(class);
        let name_and_type_index = self.name_and_type(name, descriptor);
        self.raw_constant(with_u2s(10, &[class_index, name_and_type_index]))
    }

    pub fn interface(&mut self, name: &str) {
        let class_index = self.class(name);
        self.interfaces.push(class_index);
    }

    /// Adds a `public static final` field, with a `ConstantValue` attribute
    /// when `constant_value_index` is given.
    pub fn field(&mut self, name: &str, descriptor: &str, constant_value_index: Option<u16>) {
        let mut field = Vec::new();
        field.extend(0x0019u16.to_be_bytes());
        field.extend(self.utf8(name).to_be_bytes());
        field.extend(self.utf8(descriptor).to_be_bytes());
        match constant_value_index {
            Some(index) => {
                let attribute = self.attribute("ConstantValue", &index.to_be_bytes());
                field.extend(1u16.to_be_bytes());
                field.extend(attribute);
            }
            None => field.extend(0u16.to_be_bytes()),
        }
        self.fields.push(field);
    }

    /// Adds a `public static` method whose `Code` attribute holds `code`.
    pub fn method(&mut self, name: &str, descriptor: &str, code: &[u8]) {
        let mut body = Vec::new();
        body.extend(2u16.to_be_bytes()); // max_stack
        body.extend(1u16.to_be_bytes()); // max_locals
        body.extend((code.len() as u32).to_be_bytes());
        body.extend(code);
        body.extend(0u16.to_be_bytes()); // exception table
        body.extend(0u16.to_be_bytes()); // attributes
        let code_attribute = self.attribute("Code", &body);

        let mut method = Vec::new();
        method.extend(0x0009u16.to_be_bytes());
        method.extend(self.utf8(name).to_be_bytes());
        method.extend(self.utf8(descriptor).to_be_bytes());
        method.extend(1u16.to_be_bytes());
        method.extend(code_attribute);
        self.methods.push(method);
    }

    pub fn source_file(&mut self, name: &str) {
        let sourcefile_index = self.utf8(name);
        self.class_attribute("SourceFile", &sourcefile_index.to_be_bytes());
    }

    pub fn class_attribute(&mut self, name: &str, body: &[u8]) {
        let attribute = self.attribute(name, body);
        self.class_attributes.push(attribute);
    }

    fn attribute(&mut self, name: &str, body: &[u8]) -> Vec<u8> {
        let mut bytes = self.utf8(name).to_be_bytes().to_vec();
        bytes.extend((body.len() as u32).to_be_bytes());
        bytes.extend(body);
        bytes
    }

    pub fn build(mut self, this_class: &str) -> Vec<u8> {
        let this_class_index = self.class(this_class);
        let super_class_index = self.class("java/lang/Object");

        let mut bytes = Vec::new();
        bytes.extend(self.magic.to_be_bytes());
        bytes.extend(0u16.to_be_bytes());
        bytes.extend(52u16.to_be_bytes());
        bytes.extend(self.next_index.to_be_bytes());
        for constant in &self.constants {
            bytes.extend(constant);
        }
        bytes.extend(0x0021u16.to_be_bytes());
        bytes.extend(this_class_index.to_be_bytes());
        bytes.extend(super_class_index.to_be_bytes());
        bytes.extend((self.interfaces.len() as u16).to_be_bytes());
        for interface in &self.interfaces {
            bytes.extend(interface.to_be_bytes());
        }
        bytes.extend((self.fields.len() as u16).to_be_bytes());
        for field in &self.fields {
            bytes.extend(field);
        }
        bytes.extend((self.methods.len() as u16).to_be_bytes());
        for method in &self.methods {
            bytes.extend(method);
        }
        bytes.extend((self.class_attributes.len() as u16).to_be_bytes());
        for attribute in &self.class_attributes {
            bytes.extend(attribute);
        }
        bytes
    }
}

fn with_u2s(tag: u8, values: &[u16]) -> Vec<u8> {
    let mut bytes = vec![tag];
    for value in values {
        bytes.extend(value.to_be_bytes());
    }
    bytes
}

/// `getstatic #out; ldc #message; invokevirtual #println; return`, with the
/// pool indices filled in by `builder`.
pub fn hello_code(builder: &mut ClassBuilder, message: &str) -> Vec<u8> {
    let out = builder.field_ref("java/lang/System", "out", "Ljava/io/PrintStream;");
    let message = builder.string(message);
    let println = builder.method_ref("java/io/PrintStream", "println", "(Ljava/lang/String;)V");
    assert!(message <= u8::MAX as u16, "ldc takes a one byte index");

    let mut code = vec![GETSTATIC];
    code.extend(out.to_be_bytes());
    code.extend([LDC, message as u8, INVOKEVIRTUAL]);
    code.extend(println.to_be_bytes());
    code.push(RETURN);
    code
}

/// The class javac would produce for a `HelloWorld.main` printing
/// `Hello, World!`.
pub fn hello_world() -> Vec<u8> {
    let mut builder = ClassBuilder::new();
    let code = hello_code(&mut builder, "Hello, World!");
    builder.method("main", "([Ljava/lang/String;)V", &code);
    builder.source_file("HelloWorld.java");
    builder.build("HelloWorld")
}
