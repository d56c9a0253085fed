//! Debug Session State: the per-view persistent store of enable
//! flag, cursor line, overrides and lock state that sits alongside the pure
//! transformer functions.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::context::build_context;
use crate::debugger::modify_shader_for_debugging;
use crate::error::ShaderDebugError;
use crate::parser;
use crate::types::{CustomParams, DebugFunctionContext, LoopCaps};

/// Immutable snapshot of a `DebugSession`, returned by `get_state()`. This
/// is the type a host persists/restores as JSON to carry user intent
/// across calls.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DebugSessionState {
    pub enabled: bool,
    pub current_line: Option<usize>,
    pub line_content: String,
    pub file_path: String,
    pub is_line_locked: bool,
    pub custom_params: CustomParams,
    pub loop_caps: LoopCaps,
    pub function_context: Option<DebugFunctionContext>,
    /// Not serialized: hosts that persist state reload the source
    /// themselves and call `set_original_code` again.
    #[serde(skip)]
    pub cached_source: Option<String>,
}

type StateCallback = Box<dyn Fn(&DebugSessionState) + Send + Sync>;

/// The live, mutable session. Strictly single-threaded; hosts
/// that call in from multiple scheduling contexts should wrap it in
/// `SharedDebugSession` instead of sharing a bare `DebugSession`.
pub struct DebugSession {
    state: DebugSessionState,
    on_state_change: Option<StateCallback>,
}

impl Default for DebugSession {
    fn default() -> Self {
        DebugSession {
            state: DebugSessionState::default(),
            on_state_change: None,
        }
    }
}

impl DebugSession {
    pub fn new() -> Self {
        Self::default()
    }

    fn notify(&self) {
        if let Some(cb) = &self.on_state_change {
            cb(&self.state);
        }
    }

    pub fn toggle_enabled(&mut self) {
        self.state.enabled = !self.state.enabled;
        if !self.state.enabled {
            // Re-init on toggle-off: clears enabled
            // (already done), overrides and function context, but keeps
            // currentLine/lineContent/filePath.
            self.state.custom_params.clear();
            self.state.loop_caps.clear();
            self.state.function_context = None;
        }
        self.notify();
    }

    pub fn is_enabled(&self) -> bool {
        self.state.enabled
    }

    pub fn set_original_code(&mut self, source: impl Into<String>) {
        self.state.cached_source = Some(source.into());
        self.recompute_function_context();
        self.notify();
    }

    fn recompute_function_context(&mut self) {
        let Some(line) = self.state.current_line else {
            self.state.function_context = None;
            return;
        };
        let Some(source) = &self.state.cached_source else {
            self.state.function_context = None;
            return;
        };
        let program = parser::parse(source);
        self.state.function_context = Some(build_context(&program, line));
    }

    /// Locked + same file => ignored; different file => lock is
    /// auto-released and the update proceeds; a function change clears
    /// `custom_params`/`loop_caps`. `line == 0` or an empty `file_path` are
    /// invariant violations: rejected without mutating session state.
    pub fn update_debug_line(
        &mut self,
        line: usize,
        content: impl Into<String>,
        file_path: impl Into<String>,
    ) -> Result<(), ShaderDebugError> {
        if line == 0 {
            return Err(ShaderDebugError::InvalidLine(line));
        }
        let file_path = file_path.into();
        if file_path.is_empty() {
            return Err(ShaderDebugError::EmptyFilePath);
        }

        if self.state.is_line_locked {
            if file_path == self.state.file_path {
                return Ok(());
            }
            self.state.is_line_locked = false;
        }

        let previous_function_name = self
            .state
            .function_context
            .as_ref()
            .map(|c| c.function_name.clone());

        self.state.current_line = Some(line);
        self.state.line_content = content.into();
        self.state.file_path = file_path;
        self.recompute_function_context();

        let new_function_name = self
            .state
            .function_context
            .as_ref()
            .map(|c| c.function_name.clone());
        if previous_function_name != new_function_name {
            self.state.custom_params.clear();
            self.state.loop_caps.clear();
        }

        self.notify();
        Ok(())
    }

    pub fn set_custom_parameter(&mut self, index: usize, value: Option<String>) {
        match value {
            Some(v) => {
                self.state.custom_params.insert(index, v);
            }
            None => {
                self.state.custom_params.remove(&index);
            }
        }
        self.notify();
    }

    pub fn set_loop_max_iterations(&mut self, loop_index: usize, max_iter: Option<u32>) {
        match max_iter {
            Some(n) => {
                self.state.loop_caps.insert(loop_index, n);
            }
            None => {
                self.state.loop_caps.remove(&loop_index);
            }
        }
        self.notify();
    }

    pub fn toggle_line_lock(&mut self) {
        self.state.is_line_locked = !self.state.is_line_locked;
        self.notify();
    }

    /// Defensive copy of the current state.
    pub fn get_state(&self) -> DebugSessionState {
        self.state.clone()
    }

    pub fn set_state_callback<F>(&mut self, callback: F)
    where
        F: Fn(&DebugSessionState) + Send + Sync + 'static,
    {
        self.on_state_change = Some(Box::new(callback));
    }

    /// Convenience: run the transformer against the session's own state.
    /// Returns `None` when disabled or no source/line has been recorded
    /// yet, in addition to the transformer's own "not debuggable" cases.
    pub fn compute_output(&self) -> Option<String> {
        if !self.state.enabled {
            return None;
        }
        let source = self.state.cached_source.as_ref()?;
        let line = self.state.current_line?;
        modify_shader_for_debugging(
            source,
            line,
            &self.state.line_content,
            Some(&self.state.custom_params),
            Some(&self.state.loop_caps),
        )
    }
}

/// A `DebugSession` usable from multiple scheduling contexts. Spec §5:
/// "host must serialize calls that mutate the same session" — this wraps
/// that serialization in a mutex so a host that genuinely needs to call in
/// from more than one thread doesn't have to hand-roll it.
#[derive(Clone)]
pub struct SharedDebugSession(Arc<Mutex<DebugSession>>);

impl Default for SharedDebugSession {
    fn default() -> Self {
        SharedDebugSession(Arc::new(Mutex::new(DebugSession::new())))
    }
}

impl SharedDebugSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut DebugSession) -> R) -> R {
        let mut guard = self.0.lock().expect("debug session mutex poisoned");
        f(&mut guard)
    }
}
