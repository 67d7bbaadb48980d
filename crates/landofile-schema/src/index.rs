//! Schema flattening
//!
//! [`SchemaIndex::flatten`] walks a schema depth-first and records a
//! [`PropertyDescriptor`] for every reachable node under a `/`-joined path:
//!
//! ```text
//! name                    properties.name
//! services/*              patternProperties of services (any key)
//! services/*#1            second oneOf/anyOf branch of services/*
//! services/*/type         property reachable through any branch
//! $defs/service           definition, indexed but never attached
//! ```
//!
//! `$ref` targets are merged under the referencing node with local fields
//! winning. Cycle detection uses the stack of references currently being
//! expanded on the path from the root, so a shared definition reached along
//! two unrelated paths is indexed under both.

use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::ops::Bound;
use tracing::debug;

use crate::descriptor::PropertyDescriptor;
use crate::error::{SchemaError, SchemaResult};
use crate::node::{NodeKind, SchemaNode};

/// Path segment standing for any key matched by `patternProperties`
pub const WILDCARD: &str = "*";

/// Path prefix under which `$defs` entries are indexed
pub const DEFS_SEGMENT: &str = "$defs";

/// Flattened `path -> descriptor` lookup table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaIndex {
    entries: BTreeMap<String, PropertyDescriptor>,
}

impl SchemaIndex {
    /// Flatten a raw schema value.
    ///
    /// Pure and deterministic. Unresolvable references truncate their own
    /// subtree only; flattening itself cannot fail.
    pub fn flatten(schema: &Value) -> Self {
        let root = SchemaNode::from_json(schema);
        let mut flattener = Flattener {
            document: schema,
            entries: BTreeMap::new(),
            ref_stack: Vec::new(),
        };
        flattener.visit(&root, "", Registration::Replace);

        debug!(entries = flattener.entries.len(), "Flattened schema");
        Self {
            entries: flattener.entries,
        }
    }

    /// Exact lookup by flattened path
    pub fn get(&self, path: &str) -> Option<&PropertyDescriptor> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Map concrete key segments onto an indexed path.
    ///
    /// Each segment matches its literal key when indexed, otherwise the `*`
    /// wildcard at that level. An empty slice resolves to the root (`""`).
    pub fn resolve_segments<S: AsRef<str>>(&self, segments: &[S]) -> Option<String> {
        let mut path = String::new();
        for segment in segments {
            let exact = join(&path, segment.as_ref());
            if self.entries.contains_key(&exact) {
                path = exact;
                continue;
            }
            let wildcard = join(&path, WILDCARD);
            if self.entries.contains_key(&wildcard) {
                path = wildcard;
                continue;
            }
            return None;
        }
        Some(path)
    }

    /// Wildcard-aware lookup by concrete key segments
    pub fn lookup<S: AsRef<str>>(&self, segments: &[S]) -> Option<(String, &PropertyDescriptor)> {
        let path = self.resolve_segments(segments)?;
        self.entries.get(&path).map(|d| (path, d))
    }

    /// Direct named children of `path` (`""` for the document root).
    ///
    /// Wildcards, union branches and `$defs` are not children a user can type.
    pub fn children(&self, path: &str) -> Vec<(&str, &PropertyDescriptor)> {
        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{path}/")
        };

        self.entries
            .range::<str, _>((Bound::Included(prefix.as_str()), Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(&prefix))
            .filter_map(|(key, descriptor)| {
                let rest = &key[prefix.len()..];
                let addressable = !rest.is_empty()
                    && rest != WILDCARD
                    && rest != DEFS_SEGMENT
                    && !rest.contains('/')
                    && !rest.contains('#');
                addressable.then_some((rest, descriptor))
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyDescriptor)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Follow a local JSON pointer reference (`#/a/b`) inside `document`.
///
/// Only same-document references are supported; the index never fetches.
pub fn resolve_pointer<'a>(document: &'a Value, reference: &str) -> SchemaResult<&'a Value> {
    let Some(fragment) = reference.strip_prefix('#') else {
        return Err(SchemaError::ExternalRef(reference.to_string()));
    };
    if fragment.is_empty() {
        return Ok(document);
    }
    let Some(pointer) = fragment.strip_prefix('/') else {
        // Named anchors (`#foo`) are not supported
        return Err(SchemaError::UnresolvedRef(reference.to_string()));
    };

    let mut current = document;
    for raw in pointer.split('/') {
        let segment = raw.replace("~1", "/").replace("~0", "~");
        current = match current {
            Value::Object(map) => map.get(&segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
        .ok_or_else(|| SchemaError::UnresolvedRef(reference.to_string()))?;
    }
    Ok(current)
}

fn join(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{path}/{segment}")
    }
}

/// How a visit records its descriptor when the path is already indexed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Registration {
    /// Primary route to the path: overwrite
    Replace,
    /// Secondary route (union branch content, extra patterns): only fill gaps
    FillGaps,
}

struct Flattener<'a> {
    document: &'a Value,
    entries: BTreeMap<String, PropertyDescriptor>,
    /// References currently being expanded, outermost first
    ref_stack: Vec<String>,
}

impl Flattener<'_> {
    fn visit(&mut self, node: &SchemaNode, path: &str, mode: Registration) {
        let depth = self.ref_stack.len();

        match self.expand(node) {
            Ok(resolved) => {
                self.register(path, &resolved, mode);
                self.descend(&resolved, path, mode);
            }
            Err(error) => {
                debug!(path, %error, "Truncating schema subtree");
                self.register(path, node, mode);
            }
        }

        self.ref_stack.truncate(depth);
    }

    /// Follow the node's `$ref` chain, pushing each reference on the stack.
    fn expand<'n>(&mut self, node: &'n SchemaNode) -> SchemaResult<Cow<'n, SchemaNode>> {
        if node.reference.is_none() {
            return Ok(Cow::Borrowed(node));
        }
        let mut current = node.clone();
        while let Some(reference) = current.reference.take() {
            if self.ref_stack.contains(&reference) {
                return Err(SchemaError::RefCycle(reference));
            }
            let target = resolve_pointer(self.document, &reference)?;
            current = current.merged_over(SchemaNode::from_json(target));
            self.ref_stack.push(reference);
        }
        Ok(Cow::Owned(current))
    }

    fn register(&mut self, path: &str, node: &SchemaNode, mode: Registration) {
        if path.is_empty() {
            return;
        }
        let descriptor = PropertyDescriptor::from_annotations(&node.annotations);
        match mode {
            Registration::Replace => {
                self.entries.insert(path.to_string(), descriptor);
            }
            Registration::FillGaps => {
                self.entries
                    .entry(path.to_string())
                    .and_modify(|existing| existing.fill_gaps(&descriptor))
                    .or_insert(descriptor);
            }
        }
    }

    fn descend(&mut self, node: &SchemaNode, path: &str, mode: Registration) {
        for (name, def) in &node.defs {
            let def_path = join(&join(path, DEFS_SEGMENT), name);
            self.visit(def, &def_path, Registration::Replace);
        }

        match &node.kind {
            NodeKind::Properties {
                properties,
                patterns,
            } => {
                for (name, child) in properties {
                    self.visit(child, &join(path, name), mode);
                }
                self.visit_patterns(patterns, path, mode);
            }
            NodeKind::PatternProperties(patterns) => {
                self.visit_patterns(patterns, path, mode);
            }
            NodeKind::OneOf { branches, .. } => {
                for (i, branch) in branches.iter().enumerate() {
                    let branch_path = format!("{path}#{i}");
                    self.visit(branch, &branch_path, mode);
                    // Also visible before the branch is known
                    self.lift_branch(&branch_path, path);
                }
            }
            NodeKind::Terminal => {}
        }
    }

    /// Copy `branch_path` and everything below it onto `path`, filling gaps.
    ///
    /// Nested union branches (`branch_path#j`) stay where they are; only their
    /// already-lifted content under `branch_path` moves up.
    fn lift_branch(&mut self, branch_path: &str, path: &str) {
        let lifted: Vec<(String, PropertyDescriptor)> = self
            .entries
            .range::<str, _>((Bound::Included(branch_path), Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(branch_path))
            .filter_map(|(key, descriptor)| {
                let rest = &key[branch_path.len()..];
                if !rest.is_empty() && !rest.starts_with('/') {
                    return None;
                }
                let target = if path.is_empty() {
                    rest.trim_start_matches('/').to_string()
                } else {
                    format!("{path}{rest}")
                };
                Some((target, descriptor.clone()))
            })
            .collect();

        for (target, descriptor) in lifted {
            if target.is_empty() {
                continue;
            }
            self.entries
                .entry(target)
                .and_modify(|existing| existing.fill_gaps(&descriptor))
                .or_insert(descriptor);
        }
    }

    fn visit_patterns(
        &mut self,
        patterns: &[crate::node::PatternProperty],
        path: &str,
        mode: Registration,
    ) {
        let wildcard_path = join(path, WILDCARD);
        for (i, entry) in patterns.iter().enumerate() {
            let entry_mode = if i == 0 { mode } else { Registration::FillGaps };
            self.visit(&entry.schema, &wildcard_path, entry_mode);
            if let Some(descriptor) = self.entries.get_mut(&wildcard_path)
                && descriptor.pattern.is_none()
            {
                descriptor.pattern = Some(entry.pattern.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::TypeSpec;
    use serde_json::json;

    fn string_type() -> Option<TypeSpec> {
        Some(TypeSpec::Single("string".to_string()))
    }

    #[test]
    fn flattens_simple_property() {
        let index = SchemaIndex::flatten(&json!({
            "properties": { "name": { "type": "string" } }
        }));
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("name").unwrap().schema_type, string_type());
    }

    #[test]
    fn resolves_defs_reference() {
        let index = SchemaIndex::flatten(&json!({
            "$defs": { "Svc": { "type": "object" } },
            "properties": { "appserver": { "$ref": "#/$defs/Svc" } }
        }));
        assert_eq!(
            index.get("appserver").unwrap().schema_type,
            Some(TypeSpec::Single("object".to_string()))
        );
        assert!(index.contains("$defs/Svc"));
    }

    #[test]
    fn pattern_properties_use_wildcard() {
        let index = SchemaIndex::flatten(&json!({
            "properties": {
                "services": {
                    "patternProperties": {
                        "^[a-z]+$": {
                            "description": "A service",
                            "properties": { "type": { "type": "string" } }
                        }
                    }
                }
            }
        }));
        let wildcard = index.get("services/*").unwrap();
        assert_eq!(wildcard.pattern.as_deref(), Some("^[a-z]+$"));
        assert!(index.contains("services/*/type"));
    }

    #[test]
    fn union_branches_indexed_and_merged() {
        let index = SchemaIndex::flatten(&json!({
            "properties": {
                "proxy": {
                    "oneOf": [
                        { "description": "list form", "type": "array" },
                        { "properties": { "appserver": { "type": "string" } } }
                    ]
                }
            }
        }));
        assert!(index.contains("proxy#0"));
        assert!(index.contains("proxy#1/appserver"));
        assert!(index.contains("proxy/appserver"));
        assert_eq!(
            index.get("proxy").unwrap().description.as_deref(),
            Some("list form")
        );
    }

    #[test]
    fn nested_union_stays_in_its_own_branch() {
        let index = SchemaIndex::flatten(&json!({
            "properties": {
                "proxy": {
                    "oneOf": [
                        {
                            "oneOf": [
                                { "properties": { "x": { "type": "string" } } },
                                { "properties": { "only_inner": { "type": "integer" } } }
                            ]
                        },
                        { "type": "string" }
                    ]
                }
            }
        }));
        assert!(index.contains("proxy#0#1/only_inner"));
        assert!(index.contains("proxy#0/only_inner"));
        assert!(index.contains("proxy/only_inner"));
        assert!(index.contains("proxy/x"));
        assert!(!index.contains("proxy#1/only_inner"));
        assert!(!index.contains("proxy#1/x"));
        assert_eq!(index.get("proxy#1").unwrap().schema_type, string_type());
    }

    #[test]
    fn deeply_nested_unions_flatten_linearly() {
        let mut schema = json!({ "properties": { "leaf": { "type": "string" } } });
        for _ in 0..40 {
            schema = json!({ "anyOf": [schema, { "type": "null" }] });
        }
        let index = SchemaIndex::flatten(&json!({ "properties": { "root": schema } }));
        assert!(index.contains("root/leaf"));
        // root, root/leaf, then per level: two branches plus the lifted leaf
        assert_eq!(index.len(), 2 + 40 * 2 + 40);
    }

    #[test]
    fn self_reference_terminates() {
        let index = SchemaIndex::flatten(&json!({
            "$defs": {
                "tree": {
                    "description": "node",
                    "properties": { "child": { "$ref": "#/$defs/tree" } }
                }
            },
            "properties": { "root": { "$ref": "#/$defs/tree" } }
        }));
        assert!(index.contains("root"));
        assert!(index.contains("root/child"));
        assert!(!index.contains("root/child/child"));
    }

    #[test]
    fn shared_definition_indexed_on_every_path() {
        let index = SchemaIndex::flatten(&json!({
            "$defs": { "port": { "type": "integer", "description": "Port" } },
            "properties": {
                "http": { "$ref": "#/$defs/port" },
                "https": { "$ref": "#/$defs/port" }
            }
        }));
        assert_eq!(index.get("http").unwrap().description.as_deref(), Some("Port"));
        assert_eq!(index.get("https").unwrap().description.as_deref(), Some("Port"));
    }

    #[test]
    fn unresolvable_reference_truncates_only_its_subtree() {
        let index = SchemaIndex::flatten(&json!({
            "properties": {
                "broken": { "$ref": "#/$defs/missing", "description": "kept" },
                "remote": { "$ref": "https://example.com/schema.json" },
                "name": { "type": "string" }
            }
        }));
        assert_eq!(index.get("broken").unwrap().description.as_deref(), Some("kept"));
        assert!(index.contains("remote"));
        assert_eq!(index.get("name").unwrap().schema_type, string_type());
    }

    #[test]
    fn children_skip_wildcards_and_branches() {
        let index = SchemaIndex::flatten(&json!({
            "$defs": { "x": {} },
            "properties": {
                "name": {},
                "services": { "patternProperties": { ".*": {} } },
                "tooling": { "anyOf": [{ "properties": { "cmd": {} } }] }
            }
        }));
        let names: Vec<&str> = index.children("").into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["name", "services", "tooling"]);

        let names: Vec<&str> = index.children("tooling").into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["cmd"]);
    }

    #[test]
    fn resolve_segments_prefers_exact_keys() {
        let index = SchemaIndex::flatten(&json!({
            "properties": {
                "services": {
                    "properties": { "defaults": {} },
                    "patternProperties": { ".*": { "properties": { "type": {} } } }
                }
            }
        }));
        assert_eq!(
            index.resolve_segments(&["services", "defaults"]).as_deref(),
            Some("services/defaults")
        );
        assert_eq!(
            index.resolve_segments(&["services", "appserver", "type"]).as_deref(),
            Some("services/*/type")
        );
        assert_eq!(index.resolve_segments(&["nope"]), None);
        assert_eq!(index.resolve_segments::<&str>(&[]).as_deref(), Some(""));
    }

    #[test]
    fn pointer_resolution_errors() {
        let doc = json!({ "a": { "b/c": [1, 2] } });
        assert_eq!(resolve_pointer(&doc, "#/a/b~1c/1").unwrap(), &json!(2));
        assert_eq!(
            resolve_pointer(&doc, "other.json#/a"),
            Err(SchemaError::ExternalRef("other.json#/a".to_string()))
        );
        assert_eq!(
            resolve_pointer(&doc, "#/a/x"),
            Err(SchemaError::UnresolvedRef("#/a/x".to_string()))
        );
    }
}
