//! Mapping from ORM-style field kinds to store property types.

use crate::schema::{Cardinality, CROSS_REFERENCE_TYPE};

/// Type used for field kinds the table does not know.
pub const FALLBACK_TYPE: &str = "string";

/// Store property type for a field kind such as `CharField` or `ForeignKey`.
pub fn store_type_for_field(kind: &str) -> &'static str {
    match kind {
        "CharField" | "TimeField" | "URLField" => "string",
        "TextField" => "text",
        "IntegerField" | "BigIntegerField" | "SmallIntegerField" | "PositiveIntegerField"
        | "PositiveSmallIntegerField" => "int",
        "FloatField" | "DecimalField" => "number",
        "BooleanField" | "NullBooleanField" => "boolean",
        "DateField" | "DateTimeField" => "date",
        "EmailField" => "email",
        "UUIDField" => "uuid",
        "BinaryField" | "ImageField" | "FileField" => "blob",
        "ForeignKey" | "OneToOneField" | "ManyToManyField" => CROSS_REFERENCE_TYPE,
        _ => FALLBACK_TYPE,
    }
}

/// Cardinality of a relational field kind, `None` for plain fields.
pub fn relation_cardinality(kind: &str) -> Option<Cardinality> {
    match kind {
        "ForeignKey" | "OneToOneField" => Some(Cardinality::ToOne),
        "ManyToManyField" => Some(Cardinality::Many),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_kind_table() {
        let cases = [
            ("CharField", "string"),
            ("TextField", "text"),
            ("IntegerField", "int"),
            ("BigIntegerField", "int"),
            ("SmallIntegerField", "int"),
            ("PositiveIntegerField", "int"),
            ("PositiveSmallIntegerField", "int"),
            ("FloatField", "number"),
            ("DecimalField", "number"),
            ("BooleanField", "boolean"),
            ("NullBooleanField", "boolean"),
            ("DateField", "date"),
            ("DateTimeField", "date"),
            ("TimeField", "string"),
            ("EmailField", "email"),
            ("URLField", "string"),
            ("UUIDField", "uuid"),
            ("BinaryField", "blob"),
            ("ImageField", "blob"),
            ("FileField", "blob"),
            ("ForeignKey", "cref"),
            ("OneToOneField", "cref"),
            ("ManyToManyField", "cref"),
        ];
        for (kind, expected) in cases {
            assert_eq!(store_type_for_field(kind), expected, "{kind}");
        }
    }

    #[test]
    fn test_unknown_kind_falls_back_to_string() {
        assert_eq!(store_type_for_field("JSONField"), "string");
        assert_eq!(store_type_for_field(""), "string");
    }

    #[test]
    fn test_relation_cardinality() {
        assert_eq!(relation_cardinality("ForeignKey"), Some(Cardinality::ToOne));
        assert_eq!(relation_cardinality("OneToOneField"), Some(Cardinality::ToOne));
        assert_eq!(relation_cardinality("ManyToManyField"), Some(Cardinality::Many));
        assert_eq!(relation_cardinality("CharField"), None);
    }
}
