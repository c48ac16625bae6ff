/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Per-call execution context shared by every middleware in a chain.

use crate::config_bag::ConfigBag;
use crate::type_erasure::TypeErasedBox;
use std::fmt;
use std::sync::Arc;

/// Renders an input or output for logging with sensitive values removed.
pub type LogFilter = Arc<dyn Fn(&TypeErasedBox) -> String + Send + Sync>;

/// A pre-bound rendering that replaces a [`LogFilter`] for one call.
pub type LogFilterOverride = Arc<dyn Fn() -> String + Send + Sync>;

/// Renderings that take precedence over the context's log filters.
///
/// Set by middleware that change the shape of the in-flight input or output, so
/// the logger renders the shape the filters understand.
#[derive(Clone, Default)]
pub struct LogFilterOverrides {
    /// Replaces the input rendering.
    pub input: Option<LogFilterOverride>,
    /// Replaces the output rendering.
    pub output: Option<LogFilterOverride>,
}

impl fmt::Debug for LogFilterOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogFilterOverrides")
            .field("input", &self.input.is_some())
            .field("output", &self.output.is_some())
            .finish()
    }
}

fn type_name_filter() -> LogFilter {
    Arc::new(|value: &TypeErasedBox| format!("<{}>", value.type_name()))
}

/// Execution context of a single call.
pub struct HandlerExecutionContext {
    client_name: String,
    command_name: String,
    input_filter_sensitive_log: LogFilter,
    output_filter_sensitive_log: LogFilter,
    overrides: LogFilterOverrides,
    attributes: ConfigBag,
}

impl fmt::Debug for HandlerExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerExecutionContext")
            .field("client_name", &self.client_name)
            .field("command_name", &self.command_name)
            .field("overrides", &self.overrides)
            .field("attributes", &self.attributes)
            .finish()
    }
}

impl HandlerExecutionContext {
    /// A context for `command_name` sent by `client_name`.
    ///
    /// Both log filters default to rendering the type name only.
    pub fn new(client_name: impl Into<String>, command_name: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
            command_name: command_name.into(),
            input_filter_sensitive_log: type_name_filter(),
            output_filter_sensitive_log: type_name_filter(),
            overrides: LogFilterOverrides::default(),
            attributes: ConfigBag::new(),
        }
    }

    /// Set the input log filter.
    pub fn with_input_filter(mut self, filter: LogFilter) -> Self {
        self.input_filter_sensitive_log = filter;
        self
    }

    /// Set the output log filter.
    pub fn with_output_filter(mut self, filter: LogFilter) -> Self {
        self.output_filter_sensitive_log = filter;
        self
    }

    /// Name of the sending client.
    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    /// Name of the command being sent.
    pub fn command_name(&self) -> &str {
        &self.command_name
    }

    /// The input log filter.
    pub fn input_filter_sensitive_log(&self) -> &LogFilter {
        &self.input_filter_sensitive_log
    }

    /// The output log filter.
    pub fn output_filter_sensitive_log(&self) -> &LogFilter {
        &self.output_filter_sensitive_log
    }

    /// Overrides set for this call.
    pub fn overrides(&self) -> &LogFilterOverrides {
        &self.overrides
    }

    /// Mutable access to the overrides.
    pub fn overrides_mut(&mut self) -> &mut LogFilterOverrides {
        &mut self.overrides
    }

    /// Per-call attributes.
    pub fn attributes(&self) -> &ConfigBag {
        &self.attributes
    }

    /// Mutable per-call attributes.
    pub fn attributes_mut(&mut self) -> &mut ConfigBag {
        &mut self.attributes
    }

    /// Render an input for logging: the input override if set, otherwise the input filter.
    pub fn render_input(&self, input: &TypeErasedBox) -> String {
        match &self.overrides.input {
            Some(render) => render(),
            None => (self.input_filter_sensitive_log)(input),
        }
    }

    /// Render an output for logging: the output override if set, otherwise the output filter.
    pub fn render_output(&self, output: &TypeErasedBox) -> String {
        match &self.overrides.output {
            Some(render) => render(),
            None => (self.output_filter_sensitive_log)(output),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn overrides_take_precedence_over_filters() {
        let mut context = HandlerExecutionContext::new("TestClient", "PingCommand")
            .with_input_filter(Arc::new(|_| "filtered".to_string()));
        let input = TypeErasedBox::new(5u8);
        assert_eq!(context.render_input(&input), "filtered");
        assert_eq!(context.render_output(&input), "<u8>");

        context.overrides_mut().input = Some(Arc::new(|| "override".to_string()));
        assert_eq!(context.render_input(&input), "override");
        assert_eq!(context.command_name(), "PingCommand");
    }
}
