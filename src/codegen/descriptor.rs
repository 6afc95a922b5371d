//! Utilities to build method/field descriptors

use crate::wash::types::Type;

/// Field descriptor of an erased type. Type variables and anything the
/// checker could not decide erase to `Object`.
pub fn type_to_descriptor(ty: &Type) -> String {
    match ty {
        Type::Primitive(p) => p.descriptor().to_string(),
        Type::Void => "V".to_string(),
        Type::Array(element) => format!("[{}", type_to_descriptor(element)),
        Type::Class { name, .. } => format!("L{};", binary_name(name)),
        Type::TypeVar(_) | Type::Wildcard | Type::Null | Type::Unknown => "Ljava/lang/Object;".to_string(),
    }
}

pub fn method_descriptor(params: &[Type], ret: &Type) -> String {
    let mut d = String::from("(");
    for p in params {
        d.push_str(&type_to_descriptor(p));
    }
    d.push(')');
    d.push_str(&type_to_descriptor(ret));
    d
}

/// Internal form of a type key: `p.Outer$Inner` → `p/Outer$Inner`
pub fn binary_name(key: &str) -> String {
    key.replace('.', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wash::types::PrimitiveKind;

    #[test]
    fn enum_constructor_descriptor() {
        let d = method_descriptor(&[Type::string(), Type::int(), Type::Primitive(PrimitiveKind::Double)], &Type::Void);
        assert_eq!(d, "(Ljava/lang/String;ID)V");
    }

    #[test]
    fn arrays_and_nested_names() {
        let values = Type::array_of(Type::class("p.Outer$Color"), 1);
        assert_eq!(method_descriptor(&[], &values), "()[Lp/Outer$Color;");
        assert_eq!(type_to_descriptor(&Type::TypeVar("T".into())), "Ljava/lang/Object;");
    }
}
