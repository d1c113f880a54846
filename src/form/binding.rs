use super::controller::{FormController, FormError, FormResult, read_lock};
use super::descriptor::FieldDescriptor;
use super::render::{self, Element, FieldState, RenderedField};
use super::value::FieldValue;

impl FormController {
    /// Current state of `name` with handlers that write back into this form.
    pub fn field_state(&self, name: &str) -> FormResult<FieldState> {
        let descriptor = self
            .descriptor(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        self.state_for(descriptor)
    }

    fn state_for(&self, descriptor: &FieldDescriptor) -> FormResult<FieldState> {
        let key = descriptor.name();
        let (value, error, touched) = {
            let state = read_lock(&self.state, "reading field state for binding")?;
            (
                state
                    .values
                    .get(key.as_str())
                    .cloned()
                    .unwrap_or(FieldValue::Empty),
                state
                    .errors
                    .get(key.as_str())
                    .map(|error| error.message().to_string()),
                state.touched.contains(&key),
            )
        };

        let on_change = self.clone();
        let on_blur = self.clone();
        Ok(FieldState::new(key, value)
            .error(error)
            .touched(touched)
            .on_change(move |next| {
                if let Err(error) = on_change.set_field_value(key.as_str(), next) {
                    tracing::error!(field = %key, %error, "bound change handler failed");
                }
            })
            .on_blur(move || {
                if let Err(error) = on_blur.blur(key.as_str()) {
                    tracing::error!(field = %key, %error, "bound blur handler failed");
                }
            }))
    }

    pub fn render_field(&self, name: &str) -> FormResult<RenderedField> {
        let descriptor = self
            .descriptor(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        self.render_descriptor(descriptor)
    }

    /// Renders every field in declaration order.
    pub fn render(&self) -> FormResult<Vec<RenderedField>> {
        self.descriptors()
            .iter()
            .map(|descriptor| self.render_descriptor(descriptor))
            .collect()
    }

    /// Submit trigger for this form, showing the loading state while any
    /// submit is in flight.
    pub fn render_submit(&self, label: impl Into<String>) -> FormResult<Element> {
        Ok(render::render_submit_button(label, self.is_submitting()?))
    }

    fn render_descriptor(&self, descriptor: &FieldDescriptor) -> FormResult<RenderedField> {
        if self.options.warn_on_unregistered_kind && !self.registry.contains(descriptor.kind()) {
            tracing::warn!(
                form = self.id.0,
                field = %descriptor.name(),
                kind = %descriptor.kind(),
                "no strategy registered for field kind; rendering nothing"
            );
        }
        let state = self.state_for(descriptor)?;
        Ok(render::render_field(&self.registry, descriptor, &state))
    }
}
