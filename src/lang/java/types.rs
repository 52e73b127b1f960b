// SPDX-License-Identifier: Apache-2.0

//! Known basic Java types and their packages.

/// The library types the engine can resolve without reading imports. Each
/// variant knows its package; the recommended-id subset is derived from the
/// variants rather than kept as a separate list.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum JavaType {
    Long,
    Integer,
    Short,
    Byte,
    Double,
    Float,
    Boolean,
    Character,
    String,
    BigDecimal,
    BigInteger,
    Uuid,
    LocalDate,
    LocalDateTime,
    LocalTime,
    Instant,
    Date,
}

impl JavaType {
    pub const ALL: &[JavaType] = &[
        JavaType::Long,
        JavaType::Integer,
        JavaType::Short,
        JavaType::Byte,
        JavaType::Double,
        JavaType::Float,
        JavaType::Boolean,
        JavaType::Character,
        JavaType::String,
        JavaType::BigDecimal,
        JavaType::BigInteger,
        JavaType::Uuid,
        JavaType::LocalDate,
        JavaType::LocalDateTime,
        JavaType::LocalTime,
        JavaType::Instant,
        JavaType::Date,
    ];

    pub fn simple_name(&self) -> &'static str {
        match self {
            JavaType::Long => "Long",
            JavaType::Integer => "Integer",
            JavaType::Short => "Short",
            JavaType::Byte => "Byte",
            JavaType::Double => "Double",
            JavaType::Float => "Float",
            JavaType::Boolean => "Boolean",
            JavaType::Character => "Character",
            JavaType::String => "String",
            JavaType::BigDecimal => "BigDecimal",
            JavaType::BigInteger => "BigInteger",
            JavaType::Uuid => "UUID",
            JavaType::LocalDate => "LocalDate",
            JavaType::LocalDateTime => "LocalDateTime",
            JavaType::LocalTime => "LocalTime",
            JavaType::Instant => "Instant",
            JavaType::Date => "Date",
        }
    }

    pub fn package(&self) -> &'static str {
        match self {
            JavaType::Long
            | JavaType::Integer
            | JavaType::Short
            | JavaType::Byte
            | JavaType::Double
            | JavaType::Float
            | JavaType::Boolean
            | JavaType::Character
            | JavaType::String => "java.lang",
            JavaType::BigDecimal | JavaType::BigInteger => "java.math",
            JavaType::Uuid | JavaType::Date => "java.util",
            JavaType::LocalDate
            | JavaType::LocalDateTime
            | JavaType::LocalTime
            | JavaType::Instant => "java.time",
        }
    }

    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.package(), self.simple_name())
    }

    /// `java.lang` is imported implicitly.
    pub fn needs_import(&self) -> bool {
        self.package() != "java.lang"
    }

    /// Whether the type makes a sensible relational id.
    pub fn is_recommended_id(&self) -> bool {
        matches!(
            self,
            JavaType::Long | JavaType::Integer | JavaType::String | JavaType::Uuid
        )
    }

    pub fn recommended_id_types() -> impl Iterator<Item = JavaType> {
        Self::ALL.iter().copied().filter(JavaType::is_recommended_id)
    }

    pub fn from_simple_name(name: &str) -> Option<JavaType> {
        Self::ALL
            .iter()
            .copied()
            .find(|ty| ty.simple_name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualified_names_follow_packages() {
        assert_eq!(JavaType::Long.qualified_name(), "java.lang.Long");
        assert_eq!(JavaType::Uuid.qualified_name(), "java.util.UUID");
        assert_eq!(JavaType::BigDecimal.qualified_name(), "java.math.BigDecimal");
        assert!(!JavaType::String.needs_import());
        assert!(JavaType::Instant.needs_import());
    }

    #[test]
    fn recommended_ids_derive_from_variants() {
        let recommended: Vec<&str> = JavaType::recommended_id_types()
            .map(|ty| ty.simple_name())
            .collect();
        assert_eq!(recommended, vec!["Long", "Integer", "String", "UUID"]);
    }

    #[test]
    fn resolves_simple_names() {
        assert_eq!(JavaType::from_simple_name("UUID"), Some(JavaType::Uuid));
        assert_eq!(JavaType::from_simple_name("Widget"), None);
    }
}
