//! The PBG data model: [`FieldType`], [`Date`], and [`Field`].
//!
//! A `Field` is a single AST node. Literal fields own their payload (a
//! number, a date, or a raw byte sequence); operator fields own an ordered
//! list of child references instead. See [`crate::expression`] for how
//! fields are addressed and stored.

use crate::expression::NodeId;

/// Tag for every kind of field recognized by the grammar.
///
/// The three bands (type-tags, literals, operators) mirror the grouping in
/// the grammar: `is_op`/`is_literal`/`is_type_tag`/`is_bool` are answerable
/// from the tag alone, with no payload inspection required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Unresolved or absent; the value a dictionary returns for an unknown
    /// variable.
    Null,

    /// `DATE` type tag, valid only as the first operand to `@`.
    TpDate,
    /// `BOOL` type tag.
    TpBool,
    /// `NUMBER` type tag.
    TpNumber,
    /// `STRING` type tag.
    TpString,

    /// `TRUE` literal.
    True,
    /// `FALSE` literal.
    False,
    /// A finite double-precision literal.
    Number,
    /// A single-quoted byte string, escapes preserved verbatim.
    String,
    /// A `YYYY-MM-DD` literal.
    Date,
    /// A `[name]` variable reference.
    Var,

    /// `!` logical negation.
    Not,
    /// `&` logical conjunction.
    And,
    /// `|` logical disjunction.
    Or,
    /// `=` polymorphic equality.
    Eq,
    /// `!=` polymorphic inequality.
    Neq,
    /// `<` ordering.
    Lt,
    /// `>` ordering.
    Gt,
    /// `<=` ordering.
    Lte,
    /// `>=` ordering.
    Gte,
    /// `?` existence check.
    Exst,
    /// `@` type check.
    Type,
}

impl FieldType {
    /// True for any of the four type-tag members (`TP_DATE`, `TP_BOOL`,
    /// `TP_NUMBER`, `TP_STRING`).
    pub fn is_type_tag(self) -> bool {
        matches!(
            self,
            FieldType::TpDate | FieldType::TpBool | FieldType::TpNumber | FieldType::TpString
        )
    }

    /// True for the literal band: `TRUE`, `FALSE`, `NUMBER`, `STRING`,
    /// `DATE`, `VAR`.
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            FieldType::True
                | FieldType::False
                | FieldType::Number
                | FieldType::String
                | FieldType::Date
                | FieldType::Var
        )
    }

    /// True for any operator.
    pub fn is_op(self) -> bool {
        matches!(
            self,
            FieldType::Not
                | FieldType::And
                | FieldType::Or
                | FieldType::Eq
                | FieldType::Neq
                | FieldType::Lt
                | FieldType::Gt
                | FieldType::Lte
                | FieldType::Gte
                | FieldType::Exst
                | FieldType::Type
        )
    }

    /// True for a field that evaluates to a truth value: `TRUE`, `FALSE`,
    /// or any operator.
    pub fn is_bool(self) -> bool {
        matches!(self, FieldType::True | FieldType::False) || self.is_op()
    }
}

/// A PBG `DATE` payload: digit-shape validated, calendar validity is not
/// enforced (see spec Open Questions — faithfully unresolved, matching the
/// original implementation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Date {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

/// The payload carried by a [`Field`], discriminated by its `FieldType`.
#[derive(Debug, Clone)]
pub enum Payload {
    /// `NULL`, `TRUE`, `FALSE`, and the four type tags carry nothing.
    None,
    /// `NUMBER`.
    Number(f64),
    /// `DATE`.
    Date(Date),
    /// `STRING` or `VAR`: raw bytes, escapes preserved byte-exact.
    Bytes(Vec<u8>),
    /// An operator's ordered child references.
    Children(Vec<NodeId>),
}

/// A single AST node: a tag plus its type-appropriate payload.
#[derive(Debug, Clone)]
pub struct Field {
    pub field_type: FieldType,
    pub payload: Payload,
}

impl Field {
    pub fn null() -> Self {
        Field {
            field_type: FieldType::Null,
            payload: Payload::None,
        }
    }

    pub fn boolean(value: bool) -> Self {
        Field {
            field_type: if value { FieldType::True } else { FieldType::False },
            payload: Payload::None,
        }
    }

    pub fn number(value: f64) -> Self {
        Field {
            field_type: FieldType::Number,
            payload: Payload::Number(value),
        }
    }

    pub fn date(year: u16, month: u8, day: u8) -> Self {
        Field {
            field_type: FieldType::Date,
            payload: Payload::Date(Date { year, month, day }),
        }
    }

    /// Builds a `STRING` field from its unescaped interior bytes (without
    /// the surrounding quotes).
    pub fn string(bytes: impl Into<Vec<u8>>) -> Self {
        Field {
            field_type: FieldType::String,
            payload: Payload::Bytes(bytes.into()),
        }
    }

    pub(crate) fn type_tag(tag: FieldType) -> Self {
        debug_assert!(tag.is_type_tag());
        Field {
            field_type: tag,
            payload: Payload::None,
        }
    }

    pub(crate) fn var(name: impl Into<Vec<u8>>) -> Self {
        Field {
            field_type: FieldType::Var,
            payload: Payload::Bytes(name.into()),
        }
    }

    pub(crate) fn operator(field_type: FieldType, capacity: usize) -> Self {
        debug_assert!(field_type.is_op());
        Field {
            field_type,
            payload: Payload::Children(Vec::with_capacity(capacity)),
        }
    }

    /// Child references of an operator field. Empty for literals.
    pub fn children(&self) -> &[NodeId] {
        match &self.payload {
            Payload::Children(c) => c,
            _ => &[],
        }
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<NodeId> {
        match &mut self.payload {
            Payload::Children(c) => c,
            _ => unreachable!("children_mut called on non-operator field"),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self.payload {
            Payload::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<Date> {
        match self.payload {
            Payload::Date(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.payload {
            Payload::Bytes(b) => Some(b),
            _ => None,
        }
    }
}
