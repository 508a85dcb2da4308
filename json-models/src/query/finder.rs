//! Finder tables: key sets mapped to URL templates.
//!
//! A finder is chosen by the exact *set* of field names a query supplies. Its template is
//! then filled positionally, in the order the finder declared its keys, so
//! `(number, street) => "http://address/number/%s/street/%s"` renders the same URL for
//! `street=foo, number=bar` as for `number=bar, street=foo`.

use std::collections::BTreeSet;

use tracing::debug;

use super::params::QueryParams;
use crate::error::{DeclarationError, ModelError};

const PLACEHOLDERS: [&str; 2] = ["%s", "{}"];

/// One registered template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finder {
    keys: Vec<String>,
    template: String,
}

enum Piece<'a> {
    Text(&'a str),
    Slot,
}

/// Splits a template into literal text and `%s` / `{}` slots.
fn pieces(template: &str) -> Vec<Piece<'_>> {
    let mut out = Vec::new();
    let mut rest = template;
    while let Some(at) = PLACEHOLDERS.iter().filter_map(|p| rest.find(p)).min() {
        if at > 0 {
            out.push(Piece::Text(&rest[..at]));
        }
        out.push(Piece::Slot);
        rest = &rest[at + 2..];
    }
    if !rest.is_empty() {
        out.push(Piece::Text(rest));
    }
    out
}

impl Finder {
    pub fn new<K, S>(keys: K, template: impl Into<String>) -> Result<Self, DeclarationError>
    where
        K: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        let template = template.into();
        if keys.is_empty() {
            return Err(DeclarationError::EmptyFinder { template });
        }
        let mut seen = BTreeSet::new();
        if let Some(key) = keys.iter().find(|k| !seen.insert(k.as_str())) {
            return Err(DeclarationError::DuplicateFinderKey {
                key: key.clone(),
                keys,
            });
        }
        let placeholders = pieces(&template)
            .iter()
            .filter(|p| matches!(p, Piece::Slot))
            .count();
        if placeholders != keys.len() {
            return Err(DeclarationError::PlaceholderCount {
                keys,
                template,
                placeholders,
            });
        }
        Ok(Self { keys, template })
    }

    /// Keys in declaration order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    fn key_set(&self) -> BTreeSet<&str> {
        self.keys.iter().map(String::as_str).collect()
    }

    /// Substitutes `params` into the template in key order. Values are not escaped.
    ///
    /// Callers pass params whose names equal this finder's keys; a missing key renders empty.
    pub fn render(&self, params: &QueryParams) -> String {
        let mut values = self.keys.iter().map(|k| params.get(k).unwrap_or_default());
        let mut url = String::with_capacity(self.template.len());
        for piece in pieces(&self.template) {
            match piece {
                Piece::Text(text) => url.push_str(text),
                Piece::Slot => url.push_str(values.next().unwrap_or_default()),
            }
        }
        url
    }
}

/// All finders of one model type. Key sets are unique within a table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinderTable {
    finders: Vec<Finder>,
}

impl FinderTable {
    pub fn new(finders: Vec<Finder>) -> Result<Self, DeclarationError> {
        let mut seen: Vec<BTreeSet<&str>> = Vec::with_capacity(finders.len());
        for finder in &finders {
            let set = finder.key_set();
            if seen.contains(&set) {
                return Err(DeclarationError::DuplicateFinder {
                    keys: finder.keys.clone(),
                });
            }
            seen.push(set);
        }
        Ok(Self { finders })
    }

    pub fn is_empty(&self) -> bool {
        self.finders.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Finder> {
        self.finders.iter()
    }

    /// The finder whose key set equals `names`, ignoring order.
    pub fn lookup<'a, I>(&self, names: I) -> Option<&Finder>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let wanted: BTreeSet<&str> = names.into_iter().collect();
        self.finders.iter().find(|f| f.key_set() == wanted)
    }

    /// Picks the finder for `params` and renders its URL.
    pub fn resolve(&self, model: &'static str, params: &QueryParams) -> Result<String, ModelError> {
        let finder = self
            .lookup(params.names())
            .ok_or_else(|| ModelError::NoRegisteredFinder {
                model,
                fields: params.names().map(str::to_string).collect(),
            })?;
        let url = finder.render(params);
        debug!(model, template = %finder.template, url = %url, "resolved finder");
        Ok(url)
    }
}
