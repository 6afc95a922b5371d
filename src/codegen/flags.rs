//! JVM access flags for planned classes and members

use std::collections::BTreeSet;

use super::plan::ClassModifier;
use crate::ast::{Modifier, TypeKind};

/// Access flag bits (JVMS 4.1, 4.5, 4.6)
pub mod access_flags {
    pub const ACC_PUBLIC: u16 = 0x0001;
    pub const ACC_PRIVATE: u16 = 0x0002;
    pub const ACC_PROTECTED: u16 = 0x0004;
    pub const ACC_STATIC: u16 = 0x0008;
    pub const ACC_FINAL: u16 = 0x0010;
    pub const ACC_SUPER: u16 = 0x0020;
    pub const ACC_SYNCHRONIZED: u16 = 0x0020;
    pub const ACC_VOLATILE: u16 = 0x0040;
    pub const ACC_TRANSIENT: u16 = 0x0080;
    pub const ACC_VARARGS: u16 = 0x0080;
    pub const ACC_NATIVE: u16 = 0x0100;
    pub const ACC_INTERFACE: u16 = 0x0200;
    pub const ACC_ABSTRACT: u16 = 0x0400;
    pub const ACC_STRICT: u16 = 0x0800;
    pub const ACC_SYNTHETIC: u16 = 0x1000;
    pub const ACC_ANNOTATION: u16 = 0x2000;
    pub const ACC_ENUM: u16 = 0x4000;
}

use access_flags::*;

/// Member flags for written modifiers
pub fn modifiers_to_flags(modifiers: &[Modifier]) -> u16 {
    let mut flags = 0;
    for modifier in modifiers {
        match modifier {
            Modifier::Public => flags |= ACC_PUBLIC,
            Modifier::Private => flags |= ACC_PRIVATE,
            Modifier::Protected => flags |= ACC_PROTECTED,
            Modifier::Static => flags |= ACC_STATIC,
            Modifier::Final => flags |= ACC_FINAL,
            Modifier::Abstract => flags |= ACC_ABSTRACT,
            Modifier::Native => flags |= ACC_NATIVE,
            Modifier::Synchronized => flags |= ACC_SYNCHRONIZED,
            Modifier::Transient => flags |= ACC_TRANSIENT,
            Modifier::Volatile => flags |= ACC_VOLATILE,
            Modifier::Strictfp => flags |= ACC_STRICT,
            // no class file bit
            Modifier::Default | Modifier::Sealed | Modifier::NonSealed => {}
        }
    }
    flags
}

/// Flags of the class file itself. Class files only know public access:
/// protected nested types are written public, private ones package-private.
pub fn class_flags(kind: TypeKind, modifiers: &[Modifier], class_modifiers: &BTreeSet<ClassModifier>) -> u16 {
    let mut flags = 0;
    if modifiers.contains(&Modifier::Public) || modifiers.contains(&Modifier::Protected) {
        flags |= ACC_PUBLIC;
    }
    flags |= match kind {
        TypeKind::Interface => ACC_INTERFACE | ACC_ABSTRACT,
        TypeKind::Annotation => ACC_INTERFACE | ACC_ABSTRACT | ACC_ANNOTATION,
        TypeKind::Enum => ACC_SUPER | ACC_ENUM,
        TypeKind::Class | TypeKind::Record => ACC_SUPER,
    };
    if class_modifiers.contains(&ClassModifier::Final) {
        flags |= ACC_FINAL;
    }
    if class_modifiers.contains(&ClassModifier::Abstract) {
        flags |= ACC_ABSTRACT;
    }
    flags
}

/// Access bits of a constructor nobody wrote: the class's own access,
/// private for enums
pub fn default_constructor_flags(kind: TypeKind, modifiers: &[Modifier]) -> u16 {
    if kind == TypeKind::Enum {
        return ACC_PRIVATE;
    }
    modifiers_to_flags(modifiers) & (ACC_PUBLIC | ACC_PROTECTED | ACC_PRIVATE)
}

/// Human-readable flag names in javap order
pub fn flag_names(flags: u16) -> Vec<&'static str> {
    const NAMES: &[(u16, &str)] = &[
        (ACC_PUBLIC, "ACC_PUBLIC"),
        (ACC_PRIVATE, "ACC_PRIVATE"),
        (ACC_PROTECTED, "ACC_PROTECTED"),
        (ACC_STATIC, "ACC_STATIC"),
        (ACC_FINAL, "ACC_FINAL"),
        (ACC_SUPER, "ACC_SUPER"),
        (ACC_INTERFACE, "ACC_INTERFACE"),
        (ACC_ABSTRACT, "ACC_ABSTRACT"),
        (ACC_SYNTHETIC, "ACC_SYNTHETIC"),
        (ACC_ANNOTATION, "ACC_ANNOTATION"),
        (ACC_ENUM, "ACC_ENUM"),
    ];
    NAMES.iter().filter(|(bit, _)| flags & bit != 0).map(|(_, n)| *n).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_class_flags() {
        let finals: BTreeSet<ClassModifier> = [ClassModifier::Final].into_iter().collect();
        let flags = class_flags(TypeKind::Enum, &[Modifier::Public], &finals);
        assert_eq!(flags, ACC_PUBLIC | ACC_FINAL | ACC_SUPER | ACC_ENUM);
        assert_eq!(flag_names(flags), vec!["ACC_PUBLIC", "ACC_FINAL", "ACC_SUPER", "ACC_ENUM"]);
    }

    #[test]
    fn interface_flags_ignore_private() {
        let flags = class_flags(TypeKind::Interface, &[Modifier::Private], &BTreeSet::new());
        assert_eq!(flags, ACC_INTERFACE | ACC_ABSTRACT);
    }

    #[test]
    fn default_constructor_follows_class_access() {
        assert_eq!(default_constructor_flags(TypeKind::Class, &[Modifier::Public, Modifier::Final]), ACC_PUBLIC);
        assert_eq!(default_constructor_flags(TypeKind::Enum, &[Modifier::Public]), ACC_PRIVATE);
    }
}
