mod common;

use common::{ClassBuilder, hello_world};
use minijvm::class::BootstrapMethod;
use minijvm::consts::FieldAccessFlag;
use minijvm::descriptor::FieldType;
use minijvm::{ClassFile, ConstantPoolInfo};

struct Members {
    class: ClassFile,
    answer: u16,
    handle: u16,
    metafactory: u16,
}

fn members_class() -> Members {
    let mut builder = ClassBuilder::new();
    let answer = builder.raw_constant(vec![3, 0, 0, 0, 42]);
    builder.field("ANSWER", "I", Some(answer));
    builder.field("names", "[Ljava/lang/String;", None);
    builder.interface("java/lang/Runnable");
    builder.interface("java/io/Serializable");

    let metafactory = builder.method_ref(
        "java/lang/invoke/LambdaMetafactory",
        "metafactory",
        "(Ljava/lang/invoke/MethodHandles$Lookup;)Ljava/lang/invoke/CallSite;",
    );
    let mut handle_bytes = vec![15, 6];
    handle_bytes.extend(metafactory.to_be_bytes());
    let handle = builder.raw_constant(handle_bytes);

    let mut bootstrap = 1u16.to_be_bytes().to_vec();
    bootstrap.extend(handle.to_be_bytes());
    bootstrap.extend(1u16.to_be_bytes());
    bootstrap.extend(answer.to_be_bytes());
    builder.class_attribute("BootstrapMethods", &bootstrap);

    Members {
        class: ClassFile::parse(&builder.build("Members")).unwrap(),
        answer,
        handle,
        metafactory,
    }
}

#[test]
fn test_interfaces() {
    let Members { class, .. } = members_class();
    assert_eq!(class.interfaces.len(), 2);
    assert_eq!(
        class.interface_names().unwrap(),
        vec!["java.lang.Runnable".to_string(), "java.io.Serializable".to_string()]
    );
}

#[test]
fn test_constant_field() {
    let Members { class, answer, .. } = members_class();
    let pool = &class.constant_pool;
    assert_eq!(class.fields.len(), 2);

    let field = &class.fields[0];
    assert_eq!(field.name(pool).unwrap(), "ANSWER");
    assert_eq!(field.descriptor(pool).unwrap(), "I");
    assert_eq!(field.field_type(pool).unwrap(), FieldType::Int);
    assert!(
        field
            .access_flags
            .contains(FieldAccessFlag::STATIC | FieldAccessFlag::FINAL)
    );

    let index = field.constant_value_index().unwrap();
    assert_eq!(index, answer);
    assert_eq!(pool.get(index).unwrap().as_int(), Some(42));
}

#[test]
fn test_field_without_attributes() {
    let Members { class, .. } = members_class();
    let pool = &class.constant_pool;
    let field = &class.fields[1];
    assert_eq!(field.name(pool).unwrap(), "names");
    assert_eq!(
        field.field_type(pool).unwrap(),
        FieldType::Array(Box::new(FieldType::Object("java/lang/String".to_string())))
    );
    assert_eq!(field.constant_value_index(), None);
}

#[test]
fn test_bootstrap_methods() {
    let Members {
        class,
        answer,
        handle,
        metafactory,
    } = members_class();

    assert_eq!(
        class.bootstrap_methods(),
        &[BootstrapMethod {
            bootstrap_method_ref: handle,
            bootstrap_arguments: vec![answer],
        }]
    );
    assert_eq!(
        class.constant_pool.get(handle).unwrap(),
        &ConstantPoolInfo::MethodHandle {
            reference_kind: 6,
            reference_index: metafactory,
        }
    );
    assert_eq!(class.source_file(), None);
}

#[test]
fn test_no_bootstrap_methods() {
    let class = ClassFile::parse(&hello_world()).unwrap();
    assert!(class.bootstrap_methods().is_empty());
    assert!(class.fields.is_empty());
}
