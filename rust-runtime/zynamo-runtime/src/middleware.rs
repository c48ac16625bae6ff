/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! An ordered, named stack of middleware.
//!
//! Middleware are added either at an absolute position (a [`Step`] and a
//! [`Priority`]) or relative to another middleware by name. Resolving the stack
//! sorts absolute entries by step, then priority, keeping insertion order for
//! ties, and splices relative entries around their anchors.
//!
//! ```
//! # use zynamo_runtime::middleware::*;
//! # use zynamo_runtime::handler::{HandlerArguments, HandlerResult};
//! # use zynamo_runtime::context::HandlerExecutionContext;
//! # use zynamo_runtime::BoxFuture;
//! #[derive(Debug)]
//! struct PassThrough;
//!
//! impl Middleware for PassThrough {
//!     fn handle<'a>(
//!         &'a self,
//!         args: HandlerArguments,
//!         context: &'a mut HandlerExecutionContext,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, HandlerResult> {
//!         next.run(args, context)
//!     }
//! }
//!
//! let mut stack = MiddlewareStack::new();
//! stack.add(PassThrough, AddOptions::new(Step::Build).name("build")).unwrap();
//! stack.add(PassThrough, AddOptions::new(Step::Initialize).name("init")).unwrap();
//! stack
//!     .add_relative_to(PassThrough, RelativeOptions::before("build").name("sign"))
//!     .unwrap();
//! assert_eq!(
//!     stack.identify(),
//!     vec!["init - initialize", "sign - before build", "build - build"]
//! );
//! ```

use crate::context::HandlerExecutionContext;
use crate::handler::{Handler, HandlerArguments, HandlerResult};
use crate::BoxFuture;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Lifecycle step of a middleware. Earlier steps wrap later ones.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Step {
    /// Prepares the input. Runs first.
    #[default]
    Initialize,
    /// Turns the input into an HTTP request.
    Serialize,
    /// Adjusts the HTTP request.
    Build,
    /// Last adjustments before dispatch, such as signing.
    FinalizeRequest,
    /// Turns the HTTP response into an output. Runs closest to the transport.
    Deserialize,
}

impl Step {
    fn weight(self) -> u8 {
        match self {
            Step::Initialize => 5,
            Step::Serialize => 4,
            Step::Build => 3,
            Step::FinalizeRequest => 2,
            Step::Deserialize => 1,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Step::Initialize => "initialize",
            Step::Serialize => "serialize",
            Step::Build => "build",
            Step::FinalizeRequest => "finalizeRequest",
            Step::Deserialize => "deserialize",
        })
    }
}

/// Ordering within a step. Higher priority runs first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Priority {
    /// Runs before `Normal`.
    High,
    /// The default.
    #[default]
    Normal,
    /// Runs after `Normal`.
    Low,
}

impl Priority {
    fn weight(self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Normal => 2,
            Priority::Low => 1,
        }
    }
}

/// Placement of a relative middleware with respect to its anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Relation {
    /// Immediately before the anchor.
    Before,
    /// Immediately after the anchor.
    After,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Relation::Before => "before",
            Relation::After => "after",
        })
    }
}

/// Options for [`MiddlewareStack::add`].
#[derive(Clone, Debug, Default)]
pub struct AddOptions {
    step: Step,
    priority: Priority,
    name: Option<String>,
    override_existing: bool,
}

impl AddOptions {
    /// Add at `step` with normal priority.
    pub fn new(step: Step) -> Self {
        Self {
            step,
            ..Default::default()
        }
    }

    /// Name the middleware. Names are unique within a stack.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the priority.
    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Replace a middleware of the same name instead of failing.
    ///
    /// The replaced middleware must have the same step and priority.
    pub fn override_existing(mut self, override_existing: bool) -> Self {
        self.override_existing = override_existing;
        self
    }
}

/// Options for [`MiddlewareStack::add_relative_to`].
#[derive(Clone, Debug)]
pub struct RelativeOptions {
    relation: Relation,
    to_middleware: String,
    name: Option<String>,
    override_existing: bool,
}

impl RelativeOptions {
    /// Place immediately before `to_middleware`.
    pub fn before(to_middleware: impl Into<String>) -> Self {
        Self::new(Relation::Before, to_middleware)
    }

    /// Place immediately after `to_middleware`.
    pub fn after(to_middleware: impl Into<String>) -> Self {
        Self::new(Relation::After, to_middleware)
    }

    /// Place relative to `to_middleware`.
    pub fn new(relation: Relation, to_middleware: impl Into<String>) -> Self {
        Self {
            relation,
            to_middleware: to_middleware.into(),
            name: None,
            override_existing: false,
        }
    }

    /// Name the middleware. Names are unique within a stack.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replace a middleware of the same name instead of failing.
    ///
    /// The replaced middleware must have the same relation and anchor.
    pub fn override_existing(mut self, override_existing: bool) -> Self {
        self.override_existing = override_existing;
        self
    }
}

/// Failure to add to or resolve a [`MiddlewareStack`].
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum MiddlewareError {
    /// A middleware with this name is already in the stack.
    #[error("duplicate middleware name `{0}`")]
    DuplicateName(String),
    /// An override names a middleware placed differently.
    #[error("`{name}` middleware {existing} cannot be overridden by the same-name middleware {replacement}")]
    IncompatibleOverride {
        /// The contested name.
        name: String,
        /// Placement of the middleware in the stack.
        existing: String,
        /// Placement of the replacement.
        replacement: String,
    },
    /// A relative middleware's anchor is not in the stack.
    #[error("`{to_middleware}` is not found when adding `{name}` middleware {relation} `{to_middleware}`")]
    MissingAnchor {
        /// Name of the relative middleware, or `anonymous`.
        name: String,
        /// Its relation.
        relation: Relation,
        /// The missing anchor.
        to_middleware: String,
    },
}

/// A step in the request pipeline.
///
/// A middleware receives the arguments, may change them, calls `next` zero or
/// one times and may change what comes back.
pub trait Middleware: Send + Sync + fmt::Debug {
    /// Handle a call.
    fn handle<'a>(
        &'a self,
        args: HandlerArguments,
        context: &'a mut HandlerExecutionContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, HandlerResult>;
}

/// A reference-counted [`Middleware`].
pub type SharedMiddleware = Arc<dyn Middleware>;

/// The remainder of a chain.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    chain: &'a [SharedMiddleware],
    terminal: &'a dyn Handler,
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("remaining", &self.chain.len())
            .field("terminal", &self.terminal)
            .finish()
    }
}

impl<'a> Next<'a> {
    /// Run the rest of the chain.
    ///
    /// The context may be reborrowed for a shorter lifetime so the caller can
    /// use it again once the returned future completes.
    pub fn run<'b>(
        self,
        args: HandlerArguments,
        context: &'b mut HandlerExecutionContext,
    ) -> BoxFuture<'b, HandlerResult>
    where
        'a: 'b,
    {
        match self.chain.split_first() {
            Some((head, rest)) => head.handle(
                args,
                context,
                Next {
                    chain: rest,
                    terminal: self.terminal,
                },
            ),
            None => self.terminal.handle(args, context),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Placement {
    Absolute { step: Step, priority: Priority },
    Relative { relation: Relation, to_middleware: String },
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placement::Absolute { step, priority } => write!(f, "{}/{:?}", step, priority),
            Placement::Relative {
                relation,
                to_middleware,
            } => write!(f, "{} {}", relation, to_middleware),
        }
    }
}

#[derive(Clone, Debug)]
struct Entry {
    middleware: SharedMiddleware,
    name: Option<String>,
    placement: Placement,
    override_existing: bool,
}

/// An ordered, named collection of middleware.
///
/// Cloning a stack is cheap; the middleware themselves are shared.
#[derive(Clone, Debug, Default)]
pub struct MiddlewareStack {
    entries: Vec<Entry>,
}

impl MiddlewareStack {
    /// An empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `middleware` at an absolute position.
    pub fn add(
        &mut self,
        middleware: impl Middleware + 'static,
        options: AddOptions,
    ) -> Result<(), MiddlewareError> {
        self.add_shared(Arc::new(middleware), options)
    }

    /// Add an already shared middleware at an absolute position.
    pub fn add_shared(
        &mut self,
        middleware: SharedMiddleware,
        options: AddOptions,
    ) -> Result<(), MiddlewareError> {
        self.insert(Entry {
            middleware,
            name: options.name,
            placement: Placement::Absolute {
                step: options.step,
                priority: options.priority,
            },
            override_existing: options.override_existing,
        })
    }

    /// Add `middleware` relative to another middleware.
    ///
    /// The anchor does not need to exist yet; it is looked up when the stack is resolved.
    pub fn add_relative_to(
        &mut self,
        middleware: impl Middleware + 'static,
        options: RelativeOptions,
    ) -> Result<(), MiddlewareError> {
        self.insert(Entry {
            middleware: Arc::new(middleware),
            name: options.name,
            placement: Placement::Relative {
                relation: options.relation,
                to_middleware: options.to_middleware,
            },
            override_existing: options.override_existing,
        })
    }

    fn insert(&mut self, entry: Entry) -> Result<(), MiddlewareError> {
        if let Some(name) = &entry.name {
            if let Some(index) = self.position(name) {
                if !entry.override_existing {
                    return Err(MiddlewareError::DuplicateName(name.clone()));
                }
                let existing = &self.entries[index];
                if existing.placement != entry.placement {
                    return Err(MiddlewareError::IncompatibleOverride {
                        name: name.clone(),
                        existing: existing.placement.to_string(),
                        replacement: entry.placement.to_string(),
                    });
                }
                self.entries.remove(index);
            }
        }
        self.entries.push(entry);
        Ok(())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.name.as_deref() == Some(name))
    }

    /// True if a middleware named `name` is in the stack.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Remove the middleware named `name`. Returns whether one was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Number of middleware in the stack.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A new stack holding this stack's middleware followed by `other`'s.
    ///
    /// Entries of `other` are added with their own override setting, so a
    /// same-name entry replaces this stack's only if it was added with
    /// `override_existing`.
    pub fn concat(&self, other: &MiddlewareStack) -> Result<MiddlewareStack, MiddlewareError> {
        let mut stack = self.clone();
        for entry in &other.entries {
            stack.insert(entry.clone())?;
        }
        Ok(stack)
    }

    /// Names and placements in resolution order, for debugging.
    ///
    /// Relative middleware whose anchor is missing are left out.
    pub fn identify(&self) -> Vec<String> {
        self.ordered(true)
            .unwrap_or_default()
            .into_iter()
            .map(|index| {
                let entry = &self.entries[index];
                let name = entry.name.as_deref().unwrap_or("anonymous");
                match &entry.placement {
                    Placement::Absolute { step, .. } => format!("{} - {}", name, step),
                    placement => format!("{} - {}", name, placement),
                }
            })
            .collect()
    }

    /// Resolve the stack into a chain ending in `terminal`.
    pub fn resolve(
        &self,
        terminal: Arc<dyn Handler>,
    ) -> Result<ResolvedMiddleware, MiddlewareError> {
        let chain = self
            .ordered(false)?
            .into_iter()
            .map(|index| self.entries[index].middleware.clone())
            .collect();
        Ok(ResolvedMiddleware { chain, terminal })
    }

    fn ordered(&self, skip_missing_anchors: bool) -> Result<Vec<usize>, MiddlewareError> {
        let by_name: HashMap<&str, usize> = self
            .entries
            .iter()
            .enumerate()
            .filter_map(|(index, e)| e.name.as_deref().map(|name| (name, index)))
            .collect();

        let mut before = vec![Vec::new(); self.entries.len()];
        let mut after = vec![Vec::new(); self.entries.len()];
        let mut roots = Vec::new();
        for (index, entry) in self.entries.iter().enumerate() {
            match &entry.placement {
                Placement::Absolute { step, priority } => roots.push((index, *step, *priority)),
                Placement::Relative {
                    relation,
                    to_middleware,
                } => match by_name.get(to_middleware.as_str()) {
                    Some(&anchor) if *relation == Relation::Before => before[anchor].push(index),
                    Some(&anchor) => after[anchor].push(index),
                    None if skip_missing_anchors => {}
                    None => {
                        return Err(MiddlewareError::MissingAnchor {
                            name: entry.name.clone().unwrap_or_else(|| "anonymous".into()),
                            relation: *relation,
                            to_middleware: to_middleware.clone(),
                        })
                    }
                },
            }
        }
        roots.sort_by_key(|(_, step, priority)| (Reverse(step.weight()), Reverse(priority.weight())));

        let mut order = Vec::with_capacity(self.entries.len());
        for (root, _, _) in roots {
            expand(root, &before, &after, &mut order);
        }
        Ok(order)
    }
}

// Relative entries have a single anchor, so expansion from absolute roots
// visits each reachable entry once.
fn expand(index: usize, before: &[Vec<usize>], after: &[Vec<usize>], order: &mut Vec<usize>) {
    for &child in &before[index] {
        expand(child, before, after, order);
    }
    order.push(index);
    for &child in after[index].iter().rev() {
        expand(child, before, after, order);
    }
}

/// A resolved chain of middleware and its terminal handler.
#[derive(Clone, Debug)]
pub struct ResolvedMiddleware {
    chain: Vec<SharedMiddleware>,
    terminal: Arc<dyn Handler>,
}

impl ResolvedMiddleware {
    /// Run the chain.
    pub async fn call(
        &self,
        args: HandlerArguments,
        context: &mut HandlerExecutionContext,
    ) -> HandlerResult {
        Next {
            chain: &self.chain,
            terminal: self.terminal.as_ref(),
        }
        .run(args, context)
        .await
    }

    /// Number of middleware in the chain.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// True if the chain only holds the terminal handler.
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::HandlerOutput;
    use crate::type_erasure::TypeErasedBox;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    #[derive(Debug, Clone, Default)]
    struct Trace(Arc<Mutex<Vec<String>>>);

    impl Trace {
        fn push(&self, line: String) {
            self.0.lock().unwrap().push(line);
        }

        fn lines(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    #[derive(Debug)]
    struct Record(&'static str, Trace);

    impl Middleware for Record {
        fn handle<'a>(
            &'a self,
            args: HandlerArguments,
            context: &'a mut HandlerExecutionContext,
            next: Next<'a>,
        ) -> BoxFuture<'a, HandlerResult> {
            Box::pin(async move {
                self.1.push(format!("enter {}", self.0));
                let output = next.run(args, &mut *context).await;
                self.1.push(format!("exit {} ({})", self.0, context.command_name()));
                output
            })
        }
    }

    #[derive(Debug)]
    struct Echo(Trace);

    impl Handler for Echo {
        fn handle<'a>(
            &'a self,
            args: HandlerArguments,
            _context: &'a mut HandlerExecutionContext,
        ) -> BoxFuture<'a, HandlerResult> {
            self.0.push("terminal".into());
            Box::pin(async move {
                Ok(HandlerOutput {
                    output: Some(args.input),
                    response: None,
                })
            })
        }
    }

    fn record(name: &'static str) -> Record {
        Record(name, Trace::default())
    }

    #[test]
    fn absolute_entries_sort_by_step_then_priority() {
        let mut stack = MiddlewareStack::new();
        stack
            .add(record("d"), AddOptions::new(Step::Deserialize).name("d"))
            .unwrap();
        stack
            .add(record("s"), AddOptions::new(Step::Serialize).name("s"))
            .unwrap();
        stack
            .add(record("i-low"), AddOptions::new(Step::Initialize).name("i-low").priority(Priority::Low))
            .unwrap();
        stack
            .add(record("i"), AddOptions::new(Step::Initialize).name("i"))
            .unwrap();
        stack
            .add(record("i-high"), AddOptions::new(Step::Initialize).name("i-high").priority(Priority::High))
            .unwrap();
        stack
            .add(record("f"), AddOptions::new(Step::FinalizeRequest).name("f"))
            .unwrap();
        stack
            .add(record("b"), AddOptions::new(Step::Build).name("b"))
            .unwrap();
        assert_eq!(
            stack.identify(),
            vec![
                "i-high - initialize",
                "i - initialize",
                "i-low - initialize",
                "s - serialize",
                "b - build",
                "f - finalizeRequest",
                "d - deserialize",
            ]
        );
    }

    #[test]
    fn relative_entries_wrap_their_anchor() {
        let mut stack = MiddlewareStack::new();
        stack
            .add(record("ser"), AddOptions::new(Step::Serialize).name("ser"))
            .unwrap();
        stack
            .add_relative_to(record("b1"), RelativeOptions::before("ser").name("b1"))
            .unwrap();
        stack
            .add_relative_to(record("b2"), RelativeOptions::before("ser").name("b2"))
            .unwrap();
        stack
            .add_relative_to(record("a1"), RelativeOptions::after("ser").name("a1"))
            .unwrap();
        stack
            .add_relative_to(record("a2"), RelativeOptions::after("ser").name("a2"))
            .unwrap();
        stack
            .add_relative_to(record("b1-inner"), RelativeOptions::after("b1").name("b1-inner"))
            .unwrap();
        let names: Vec<String> = stack
            .identify()
            .into_iter()
            .map(|line| line.split(' ').next().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["b1", "b1-inner", "b2", "ser", "a2", "a1"]);
    }

    #[test]
    fn duplicate_names_require_override() {
        let mut stack = MiddlewareStack::new();
        let options = AddOptions::new(Step::Serialize).name("ser");
        stack.add(record("one"), options.clone()).unwrap();
        assert_eq!(
            stack.add(record("two"), options.clone()),
            Err(MiddlewareError::DuplicateName("ser".into()))
        );
        stack
            .add(record("two"), options.override_existing(true))
            .unwrap();
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn override_must_keep_placement() {
        let mut stack = MiddlewareStack::new();
        stack
            .add(record("one"), AddOptions::new(Step::Serialize).name("ser"))
            .unwrap();
        let err = stack
            .add(
                record("two"),
                AddOptions::new(Step::Build).name("ser").override_existing(true),
            )
            .unwrap_err();
        assert!(matches!(err, MiddlewareError::IncompatibleOverride { .. }));

        stack
            .add_relative_to(record("m"), RelativeOptions::before("ser").name("m"))
            .unwrap();
        let err = stack
            .add_relative_to(
                record("m2"),
                RelativeOptions::after("ser").name("m").override_existing(true),
            )
            .unwrap_err();
        assert!(matches!(err, MiddlewareError::IncompatibleOverride { .. }));
    }

    #[test]
    fn missing_anchor_fails_resolution_but_not_identify() {
        let trace = Trace::default();
        let mut stack = MiddlewareStack::new();
        stack
            .add_relative_to(record("m"), RelativeOptions::before("nowhere").name("m"))
            .unwrap();
        assert!(stack.identify().is_empty());
        let err = stack.resolve(Arc::new(Echo(trace))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "`nowhere` is not found when adding `m` middleware before `nowhere`"
        );
    }

    #[test]
    fn concat_honours_override_flags() {
        let mut client = MiddlewareStack::new();
        client
            .add(record("logger"), AddOptions::new(Step::Initialize).name("logger"))
            .unwrap();
        let mut command = MiddlewareStack::new();
        command
            .add(record("logger"), AddOptions::new(Step::Initialize).name("logger"))
            .unwrap();
        assert!(client.concat(&command).is_err());

        let mut command = MiddlewareStack::new();
        command
            .add(
                record("ser"),
                AddOptions::new(Step::Serialize).name("ser").override_existing(true),
            )
            .unwrap();
        let merged = client.concat(&command).unwrap();
        let merged = merged.concat(&command).unwrap();
        assert_eq!(merged.identify(), vec!["logger - initialize", "ser - serialize"]);
        assert_eq!(client.len(), 1);
    }

    #[tokio::test]
    async fn resolved_chain_runs_outermost_first() {
        let trace = Trace::default();
        let mut stack = MiddlewareStack::new();
        stack
            .add(Record("build", trace.clone()), AddOptions::new(Step::Build).name("build"))
            .unwrap();
        stack
            .add(Record("init", trace.clone()), AddOptions::new(Step::Initialize).name("init"))
            .unwrap();
        let resolved = stack.resolve(Arc::new(Echo(trace.clone()))).unwrap();
        assert_eq!(resolved.len(), 2);

        let mut context = HandlerExecutionContext::new("TestClient", "EchoCommand");
        let output = resolved
            .call(HandlerArguments::new(TypeErasedBox::new(7u32)), &mut context)
            .await
            .unwrap();
        assert_eq!(
            output.output.unwrap().downcast_ref::<u32>(),
            Some(&7u32)
        );
        assert_eq!(
            trace.lines(),
            vec![
                "enter init",
                "enter build",
                "terminal",
                "exit build (EchoCommand)",
                "exit init (EchoCommand)",
            ]
        );
    }
}
