// Input configuration and remapping

use super::action::{Action, InputSource};
use std::collections::HashMap;

/// Maps keys to sandbox actions
#[derive(Debug, Clone)]
pub struct InputConfig {
    /// Mapping from input sources to actions
    bindings: HashMap<InputSource, Action>,

    /// Reverse mapping for quick lookups (action -> all sources)
    action_to_sources: HashMap<Action, Vec<InputSource>>,
}

impl InputConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
            action_to_sources: HashMap::new(),
        }
    }

    /// Create a configuration from a list of bindings
    pub fn from_bindings(bindings: Vec<(InputSource, Action)>) -> Self {
        let mut config = Self::new();
        for (source, action) in bindings {
            config.bind(source, action);
        }
        config
    }

    /// Bind an input source to an action, replacing what it was bound to
    pub fn bind(&mut self, source: InputSource, action: Action) {
        self.unbind_source(source);
        self.bindings.insert(source, action);
        self.action_to_sources
            .entry(action)
            .or_default()
            .push(source);
    }

    pub fn unbind_source(&mut self, source: InputSource) {
        if let Some(action) = self.bindings.remove(&source) {
            if let Some(sources) = self.action_to_sources.get_mut(&action) {
                sources.retain(|s| *s != source);
                if sources.is_empty() {
                    self.action_to_sources.remove(&action);
                }
            }
        }
    }

    /// Get the action bound to an input source
    pub fn get_action(&self, source: InputSource) -> Option<Action> {
        self.bindings.get(&source).copied()
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self::from_bindings(super::action::default_bindings())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::construction::ToolKind;
    use winit::keyboard::KeyCode;

    #[test]
    fn test_bind_action() {
        let mut config = InputConfig::new();
        let source = InputSource::key(KeyCode::KeyR);
        config.bind(source, Action::ToggleRun);

        assert_eq!(config.get_action(source), Some(Action::ToggleRun));
    }

    #[test]
    fn test_unbind_source() {
        let mut config = InputConfig::new();
        let source = InputSource::key(KeyCode::KeyR);
        config.bind(source, Action::ToggleRun);
        config.unbind_source(source);

        assert_eq!(config.get_action(source), None);
        assert!(config.action_to_sources.get(&Action::ToggleRun).is_none());
    }

    #[test]
    fn test_unbinding_one_source_keeps_the_other() {
        let mut config = InputConfig::new();
        let up = InputSource::key(KeyCode::ArrowUp);
        let right = InputSource::key(KeyCode::ArrowRight);

        config.bind(up, Action::DriveForward);
        config.bind(right, Action::DriveForward);
        config.unbind_source(up);

        assert_eq!(config.get_action(up), None);
        assert_eq!(config.get_action(right), Some(Action::DriveForward));
        assert_eq!(config.action_to_sources[&Action::DriveForward], vec![right]);
    }

    #[test]
    fn test_rebind_source() {
        let mut config = InputConfig::default();
        let source = InputSource::key(KeyCode::KeyW);

        config.bind(source, Action::SelectTool(ToolKind::Circle));

        assert_eq!(
            config.get_action(source),
            Some(Action::SelectTool(ToolKind::Circle))
        );
        assert!(!config
            .action_to_sources
            .contains_key(&Action::SelectTool(ToolKind::Wheel)));
    }
}
