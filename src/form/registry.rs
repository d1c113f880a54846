use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, OnceLock};

use super::descriptor::{FieldDescriptor, FieldKind};
use super::kinds::{
    CheckboxStrategy, DateStrategy, DelegatedRenderStrategy, MultilineTextStrategy,
    PhoneNumberStrategy, SelectStrategy, TextStrategy,
};
use super::render::{Element, FieldHandlers, FieldState};
use super::value::FieldValue;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LabelPlacement {
    Above,
    Inline,
}

/// Rendering and value rules for one field kind.
pub trait FieldStrategy: Send + Sync {
    fn value_type(&self) -> &'static str;

    fn default_value(&self) -> FieldValue;

    fn accepts(&self, value: &FieldValue) -> bool;

    fn render_control(&self, descriptor: &FieldDescriptor, state: &FieldState) -> Option<Element>;

    fn label_placement(&self) -> LabelPlacement {
        LabelPlacement::Above
    }

    fn handlers(&self, _descriptor: &FieldDescriptor, state: &FieldState) -> FieldHandlers {
        FieldHandlers::from_state(state)
    }
}

#[derive(Clone)]
pub struct FieldKindRegistry {
    strategies: Arc<BTreeMap<FieldKind, Arc<dyn FieldStrategy>>>,
}

impl FieldKindRegistry {
    pub fn empty() -> Self {
        Self {
            strategies: Arc::new(BTreeMap::new()),
        }
    }

    pub fn standard() -> Self {
        static STANDARD: OnceLock<FieldKindRegistry> = OnceLock::new();
        STANDARD.get_or_init(Self::build_standard).clone()
    }

    fn build_standard() -> Self {
        Self::empty()
            .register(FieldKind::Text, TextStrategy)
            .register(FieldKind::MultilineText, MultilineTextStrategy)
            .register(FieldKind::PhoneNumber, PhoneNumberStrategy)
            .register(FieldKind::Checkbox, CheckboxStrategy)
            .register(FieldKind::Date, DateStrategy)
            .register(FieldKind::Select, SelectStrategy)
            .register(FieldKind::DelegatedRender, DelegatedRenderStrategy)
    }

    /// Adds or replaces the strategy for `kind`.
    pub fn register(mut self, kind: FieldKind, strategy: impl FieldStrategy + 'static) -> Self {
        Arc::make_mut(&mut self.strategies).insert(kind, Arc::new(strategy));
        self
    }

    pub fn unregister(mut self, kind: FieldKind) -> Self {
        Arc::make_mut(&mut self.strategies).remove(&kind);
        self
    }

    pub fn strategy(&self, kind: FieldKind) -> Option<&dyn FieldStrategy> {
        self.strategies.get(&kind).map(|strategy| &**strategy)
    }

    pub fn contains(&self, kind: FieldKind) -> bool {
        self.strategies.contains_key(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = FieldKind> + '_ {
        self.strategies.keys().copied()
    }
}

impl Default for FieldKindRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl Debug for FieldKindRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldKindRegistry")
            .field("kinds", &self.strategies.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::descriptor::FieldKey;

    struct ShoutingText;

    impl FieldStrategy for ShoutingText {
        fn value_type(&self) -> &'static str {
            "text"
        }

        fn default_value(&self) -> FieldValue {
            FieldValue::Text(String::new())
        }

        fn accepts(&self, value: &FieldValue) -> bool {
            matches!(value, FieldValue::Text(_))
        }

        fn render_control(
            &self,
            _descriptor: &FieldDescriptor,
            state: &FieldState,
        ) -> Option<Element> {
            Some(Element::Text(state.value.to_string().to_uppercase()))
        }
    }

    #[test]
    fn standard_registry_covers_every_kind() {
        let registry = FieldKindRegistry::standard();
        for kind in FieldKind::ALL {
            assert!(registry.contains(kind), "{kind} missing");
        }
    }

    #[test]
    fn registration_replaces_without_touching_shared_standard() {
        let custom = FieldKindRegistry::standard().register(FieldKind::Text, ShoutingText);
        let state = FieldState::new(FieldKey::new("name"), "ada".into());
        let descriptor = FieldDescriptor::text("name");

        let control = custom
            .strategy(FieldKind::Text)
            .and_then(|strategy| strategy.render_control(&descriptor, &state));
        assert_eq!(control, Some(Element::Text("ADA".into())));

        let standard = FieldKindRegistry::standard()
            .strategy(FieldKind::Text)
            .and_then(|strategy| strategy.render_control(&descriptor, &state));
        assert_ne!(standard, Some(Element::Text("ADA".into())));
    }

    #[test]
    fn unregister_removes_kind() {
        let registry = FieldKindRegistry::standard().unregister(FieldKind::Select);
        assert!(!registry.contains(FieldKind::Select));
        assert_eq!(registry.kinds().count(), FieldKind::ALL.len() - 1);
    }
}
