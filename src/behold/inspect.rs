//! # Inspection Points
//!
//! [`Behold`] is one configured inspection point: a fluent accumulator of
//! boolean conditions, context criteria, and value criteria, plus the
//! terminal actions that resolve, render, stash, or merely test.
//!
//! ## State machine
//!
//! An instance cycles between two states: *configuring* (chain `when`,
//! `when_context`, `when_values`, `view_context`, ...) and a terminal action
//! (`show`, `get`, `stash`, `is_true`). Every terminal resets the transient
//! filter state back to its initial pass state, so the same instance can be
//! reused for the next inspection; [`Behold::reset`] is public for callers
//! that bail out mid-configuration.
//!
//! ## Resolution precedence
//!
//! A terminal resolves its [`Args`] into an ordered name/value mapping:
//!
//! 1. at most one subject record seeds the working map, else
//! 2. the attached [`Scope`](crate::args::Scope) snapshot seeds it;
//! 3. keyword data pairs merge on top with priority over both;
//! 4. no requested names at all means the full sorted key set is shown.
//!
//! Filter failure is not an error: a suppressed inspection returns
//! `Ok(false)` / `Ok(None)` and writes nothing.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::io::{self, Write};

use serde_json::Value;

use crate::args::Args;
use crate::context;
use crate::error::{BeholdError, Result};
use crate::item::{display_value, Item, Record};
use crate::query::{self, parse_key, Op};
use crate::stash;

/// The single-method seam for turning a resolved raw value into display
/// text. Override it to plug in translation or lookup tables.
///
/// The default renders string values verbatim, other values in their compact
/// JSON form, and missing attributes as the empty string.
pub trait Extract {
    fn extract(&self, item: &Item, name: &str) -> String {
        item.get(name).map(display_value).unwrap_or_default()
    }
}

struct DefaultExtract;

impl Extract for DefaultExtract {}

/// One registered criterion: `exclude XOR op(current, criterion)` must hold.
struct Filter {
    op: Op,
    field: String,
    criterion: Value,
    exclude: bool,
}

/// A single inspection point.
///
/// Construct with the builder methods, chain filters, then call a terminal.
///
/// ```
/// use behold::{Args, Behold};
///
/// let mut debug = Behold::new().tag("loop");
/// let x = 10;
/// debug.when(x > 5).show(Args::new().field("x", x)).unwrap();
/// ```
pub struct Behold {
    tag: Option<String>,
    strict: bool,
    auto: bool,
    sink: Box<dyn Write>,
    extractor: Box<dyn Extract>,
    passes: bool,
    context_filters: Vec<Filter>,
    value_filters: Vec<Filter>,
    viewed_context: Vec<String>,
    rendered: String,
}

impl Default for Behold {
    fn default() -> Self {
        Self::new()
    }
}

impl Behold {
    pub fn new() -> Self {
        Self {
            tag: None,
            strict: false,
            auto: true,
            sink: Box::new(io::stdout()),
            extractor: Box::new(DefaultExtract),
            passes: true,
            context_filters: Vec::new(),
            value_filters: Vec::new(),
            viewed_context: Vec::new(),
            rendered: String::new(),
        }
    }

    /// Label this inspection point. The tag names the stash destination and
    /// is appended to rendered output for grep-ability.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Raise on references to nonexistent names instead of substituting an
    /// empty value.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Disable the automatic write on `show`; the rendered string is still
    /// cached and available through `Display`.
    pub fn manual(mut self) -> Self {
        self.auto = false;
        self
    }

    /// Redirect output to an alternate sink instead of stdout.
    pub fn with_sink(mut self, sink: Box<dyn Write>) -> Self {
        self.sink = sink;
        self
    }

    /// Install a custom [`Extract`] implementation.
    pub fn with_extractor(mut self, extractor: Box<dyn Extract>) -> Self {
        self.extractor = extractor;
        self
    }

    // Chaining

    /// AND a call-site boolean into the pass accumulator.
    pub fn when(&mut self, condition: bool) -> &mut Self {
        self.passes = self.passes && condition;
        self
    }

    /// AND the negation of a call-site boolean into the pass accumulator.
    pub fn excluding(&mut self, condition: bool) -> &mut Self {
        self.passes = self.passes && !condition;
        self
    }

    /// Require a context variable to satisfy a criterion. The key may carry
    /// an operator suffix (`run__gt`, `phase__in`, ...); a missing context
    /// key fails the filter.
    pub fn when_context(&mut self, key: &str, criterion: impl Into<Value>) -> &mut Self {
        self.add_context_filter(key, criterion.into(), false);
        self
    }

    /// Inverted form of [`when_context`](Behold::when_context). A missing
    /// context key still fails.
    pub fn excluding_context(&mut self, key: &str, criterion: impl Into<Value>) -> &mut Self {
        self.add_context_filter(key, criterion.into(), true);
        self
    }

    /// Require a resolved attribute's extracted string form to satisfy a
    /// criterion. Runs after resolution, against display text.
    pub fn when_values(&mut self, key: &str, criterion: impl Into<Value>) -> &mut Self {
        let (op, field) = parse_key(key);
        self.value_filters.push(Filter {
            op,
            field: field.to_string(),
            criterion: criterion.into(),
            exclude: false,
        });
        self
    }

    /// Append a context variable to rendered output regardless of the main
    /// attribute list. Absent keys render as an empty value.
    pub fn view_context(&mut self, name: impl Into<String>) -> &mut Self {
        self.viewed_context.push(name.into());
        self
    }

    fn add_context_filter(&mut self, key: &str, criterion: Value, exclude: bool) {
        let (op, field) = parse_key(key);
        self.context_filters.push(Filter {
            op,
            field: field.to_string(),
            criterion,
            exclude,
        });
    }

    // Evaluation

    /// Structural verdict: the boolean accumulator plus every registered
    /// context filter. Value filters need a resolved item and are applied by
    /// the terminals.
    pub fn passes_all(&self) -> Result<bool> {
        if !self.passes {
            return Ok(false);
        }
        self.passes_context_filters()
    }

    fn passes_context_filters(&self) -> Result<bool> {
        for filter in &self.context_filters {
            match context::context_value(&filter.field) {
                Some(current) => {
                    if !(filter.exclude ^ filter.op.eval(&current, &filter.criterion)) {
                        return Ok(false);
                    }
                }
                None => {
                    if self.strict {
                        return Err(BeholdError::StrictMiss(filter.field.clone()));
                    }
                    // Default-when-missing is fail, for exclusions too.
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    fn passes_value_filters(&self, item: &Item) -> Result<bool> {
        for filter in &self.value_filters {
            if self.strict && item.get(&filter.field).is_none() {
                return Err(BeholdError::StrictMiss(filter.field.clone()));
            }
            let current = self.extractor.extract(item, &filter.field);
            if !(filter.exclude ^ query::eval_text(filter.op, &current, &filter.criterion)) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Strict validation of viewed context names. Runs before resolution so
    /// a nonexistent viewed name is reported even when the inspection is
    /// otherwise suppressed.
    fn check_viewed_strict(&self) -> Result<()> {
        if !self.strict {
            return Ok(());
        }
        for name in &self.viewed_context {
            if !context::context_has(name) {
                return Err(BeholdError::StrictMiss(name.clone()));
            }
        }
        Ok(())
    }

    // Resolution

    /// Resolve the call payload into an item and its ordered attribute-name
    /// list, or `None` when any filter suppresses the inspection.
    fn resolve(&self, args: Args) -> Result<Option<(Item, Vec<String>)>> {
        if !self.passes_all()? {
            return Ok(None);
        }

        let Args {
            names: mut att_names,
            mut subjects,
            data,
            scope,
        } = args;

        if subjects.len() > 1 {
            return Err(BeholdError::MultipleSubjects);
        }
        let subject_fields = match subjects.pop() {
            Some(Value::Object(map)) => Some(map),
            Some(_) => return Err(BeholdError::NoAttributes),
            None => None,
        };

        // Seed the working map from the authoritative source.
        let mut working: BTreeMap<String, Value> = BTreeMap::new();
        if let Some(map) = &subject_fields {
            for (name, value) in map {
                working.insert(name.clone(), value.clone());
            }
        } else if let Some(scope) = &scope {
            for name in scope.field_names() {
                if let Some(value) = scope.field(&name) {
                    working.insert(name, value);
                }
            }
        }

        // Keyword data wins over both the subject and the scope, and its
        // names join the requested list in sorted order.
        let data_keys: HashSet<String> = data.iter().map(|(k, _)| k.clone()).collect();
        let mut data_names: Vec<String> = Vec::with_capacity(data.len());
        for (key, value) in data {
            data_names.push(key.clone());
            working.insert(key, value);
        }
        data_names.sort();
        att_names.extend(data_names);

        if att_names.is_empty() {
            att_names = working.keys().cloned().collect();
        }

        // Only a supplied subject is authoritative for strictness: names
        // merged from keyword data or sourced from the scope snapshot are
        // exempt because the working map is permissive by construction.
        if self.strict {
            if let Some(map) = &subject_fields {
                for name in &att_names {
                    if !map.contains_key(name.as_str()) && !data_keys.contains(name.as_str()) {
                        return Err(BeholdError::StrictMiss(name.clone()));
                    }
                }
            }
        }

        let mut item = Item::new();
        for name in &att_names {
            if let Some(value) = working.get(name) {
                item.set(name.clone(), value.clone());
            }
        }

        if !self.passes_value_filters(&item)? {
            return Ok(None);
        }
        Ok(Some((item, att_names)))
    }

    /// A stash/get row covers exactly the requested names; an absent name
    /// records as `Value::Null`.
    fn row(item: &Item, att_names: &[String]) -> Item {
        let mut row = Item::new();
        for name in att_names {
            row.set(name.clone(), item.get(name).cloned().unwrap_or(Value::Null));
        }
        row
    }

    // Terminals

    /// Resolve, render, and (unless constructed with [`manual`](Behold::manual))
    /// write one line to the sink. Returns whether the inspection passed.
    pub fn show(&mut self, args: Args) -> Result<bool> {
        self.check_viewed_strict()?;
        let Some((item, att_names)) = self.resolve(args)? else {
            self.reset();
            return Ok(false);
        };
        self.rendered = self.stringify_item(&item, &att_names)?;
        if self.auto {
            writeln!(self.sink, "{}", self.rendered)?;
        }
        self.reset();
        Ok(true)
    }

    /// Resolve and return the raw-value mapping, or `None` when suppressed.
    pub fn get(&mut self, args: Args) -> Result<Option<Item>> {
        let resolved = self.resolve(args)?;
        self.reset();
        Ok(resolved.map(|(item, att_names)| Self::row(&item, &att_names)))
    }

    /// Resolve and append a raw-value row to the stash under this instance's
    /// tag. Returns whether the inspection passed.
    pub fn stash(&mut self, args: Args) -> Result<bool> {
        let tag = self.tag.clone().ok_or(BeholdError::MissingTag)?;
        let Some((item, att_names)) = self.resolve(args)? else {
            self.reset();
            return Ok(false);
        };
        stash::append(&tag, Self::row(&item, &att_names));
        self.reset();
        Ok(true)
    }

    /// Pass/fail verdict only: no output, no stash.
    pub fn is_true(&mut self, args: Args) -> Result<bool> {
        let resolved = self.resolve(args)?;
        self.reset();
        Ok(resolved.is_some())
    }

    /// Clear the transient filter state back to its initial pass state.
    /// Called by every terminal; public for callers abandoning a chain.
    pub fn reset(&mut self) {
        self.passes = true;
        self.context_filters.clear();
        self.value_filters.clear();
        self.viewed_context.clear();
    }

    // Rendering

    /// Render an ordered name/value mapping into one deterministic line:
    /// `"name: value"` pairs joined by `", "`, then any viewed context
    /// fields, then the tag as a final bare token.
    pub fn stringify_item(&self, item: &Item, att_names: &[String]) -> Result<String> {
        if att_names.is_empty() {
            return Err(BeholdError::NothingToShow);
        }
        let mut parts: Vec<String> = att_names
            .iter()
            .map(|name| format!("{}: {}", name, self.extractor.extract(item, name)))
            .collect();
        for name in &self.viewed_context {
            let value = context::context_value(name)
                .map(|v| display_value(&v))
                .unwrap_or_default();
            parts.push(format!("{name}: {value}"));
        }
        let mut line = parts.join(", ");
        if let Some(tag) = &self.tag {
            line.push_str(", ");
            line.push_str(tag);
        }
        Ok(line)
    }
}

/// The cached rendering of the most recent passing `show`.
impl fmt::Display for Behold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

impl fmt::Debug for Behold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Behold")
            .field("tag", &self.tag)
            .field("strict", &self.strict)
            .field("auto", &self.auto)
            .field("passes", &self.passes)
            .field("context_filters", &self.context_filters.len())
            .field("value_filters", &self.value_filters.len())
            .finish_non_exhaustive()
    }
}
