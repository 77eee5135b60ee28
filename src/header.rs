//! HTTP header field carriage.
//!
//! Preferences carried in an HTTP response header are a structured-field
//! dictionary (RFC 8941) whose member keys are labels and whose values are
//! the bare tokens `y` or `n`. This module decodes such a field and rebuilds
//! the equivalent preference expression, so that the usual tokenizer and
//! parser rules apply unchanged.
//!
//! # Example
//!
//! ```
//! use usage_prefs::header::expression_from_field;
//!
//! assert_eq!(expression_from_field("tdm=y, genai=n"), "tdm=y,genai=n");
//! // Booleans, parameters and other tokens carry no preference.
//! assert_eq!(expression_from_field("tdm, ai=n;x=1, search=maybe, genai=y"), "genai=y");
//! ```

use sfv::visitor::{
    DictionaryVisitor, EntryVisitor, Ignored, InnerListVisitor, ItemVisitor, ParameterVisitor,
};
use sfv::{BareItemFromInput, KeyRef, Parser as FieldParser};

use crate::hierarchy::Hierarchy;
use crate::parser::{parse, ParseSummary};
use crate::record::PreferenceRecord;

/// One dictionary member, in field order.
#[derive(Debug)]
struct Member {
    key: String,
    value: Option<&'static str>,
    parameterised: bool,
}

/// Collects every member of the dictionary, repeated keys included.
#[derive(Debug, Default)]
struct Members {
    members: Vec<Member>,
}

impl<'a> DictionaryVisitor<'a> for Members {
    type Error = sfv::Error;

    fn entry<'dv, 'ev>(
        &'dv mut self,
        key: &'a KeyRef,
    ) -> Result<impl EntryVisitor<'ev>, Self::Error>
    where
        'dv: 'ev,
    {
        let index = self.members.len();
        self.members.push(Member {
            key: key.as_str().to_string(),
            value: None,
            parameterised: false,
        });
        Ok(MemberVisitor {
            member: &mut self.members[index],
        })
    }
}

struct MemberVisitor<'m> {
    member: &'m mut Member,
}

impl<'a> ItemVisitor<'a> for MemberVisitor<'_> {
    type Error = sfv::Error;

    fn bare_item<'pv>(
        self,
        bare_item: BareItemFromInput<'a>,
    ) -> Result<impl ParameterVisitor<'pv>, Self::Error> {
        self.member.value = match bare_item.as_token().map(|token| token.as_str()) {
            Some("y") => Some("y"),
            Some("n") => Some("n"),
            _ => None,
        };
        Ok(self)
    }
}

impl<'p> ParameterVisitor<'p> for MemberVisitor<'_> {
    type Error = sfv::Error;

    fn parameter(
        &mut self,
        _key: &'p KeyRef,
        _value: BareItemFromInput<'p>,
    ) -> Result<(), Self::Error> {
        self.member.parameterised = true;
        Ok(())
    }
}

impl EntryVisitor<'_> for MemberVisitor<'_> {
    fn inner_list<'ilv>(self) -> Result<impl InnerListVisitor<'ilv>, Self::Error> {
        Ok(Ignored)
    }
}

/// Rebuilds a preference expression from a structured-field dictionary.
///
/// Members are kept only if their value is the bare token `y` or `n` with no
/// parameters. Every member is kept in field order, so a repeated key keeps
/// all its values and a refusal among them still wins. A field that is not a
/// valid dictionary yields an empty expression.
pub fn expression_from_field(field: &str) -> String {
    let mut visitor = Members::default();
    if let Err(e) = FieldParser::new(field).parse_dictionary_with_visitor(&mut visitor) {
        tracing::debug!(error = %e, "ignoring malformed preference header");
        return String::new();
    }

    let mut directives = Vec::with_capacity(visitor.members.len());
    for member in &visitor.members {
        match member.value {
            Some(value) if !member.parameterised => {
                directives.push(format!("{}={}", member.key, value));
            }
            _ => tracing::trace!(key = member.key.as_str(), "dropping header member"),
        }
    }
    directives.join(",")
}

/// Parses a header field value into `record`.
pub fn parse_field(
    field: &str,
    record: &mut PreferenceRecord,
    hierarchy: &Hierarchy,
) -> ParseSummary {
    parse(expression_from_field(field), record, hierarchy, None)
}
