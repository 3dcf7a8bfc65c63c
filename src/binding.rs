use crate::driver::{DriverError, Statement};
use crate::error::{Error, NamedBinding, Result};
use crate::template::ParsedTemplate;
use crate::value::{Binding, SqlType, Value};

/// Tracks which placeholder positions of one statement have a value.
///
/// Binding a name sets every position that name occupies in the template, so a
/// parameter used three times is bound with one call.
#[derive(Debug, Clone)]
pub struct BindingState {
    template: ParsedTemplate,
    slots: Vec<Option<Binding>>,
}

impl BindingState {
    #[must_use]
    pub fn new(template: ParsedTemplate) -> Self {
        let slots = vec![None; template.placeholder_count()];
        Self { template, slots }
    }

    #[must_use]
    pub fn template(&self) -> &ParsedTemplate {
        &self.template
    }

    /// Binds `value` to every position of `name`.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownParameter`] if the template has no such name, and
    /// [`Error::AlreadyBound`] if it is already bound and `allow_rebind` is false.
    pub fn bind(&mut self, name: &str, value: Value, allow_rebind: bool) -> Result<()> {
        self.set(name, Binding::Value(value), allow_rebind)
    }

    /// Binds a typed null to every position of `name`.
    ///
    /// Without a type the null is tagged [`SqlType::Varchar`].
    ///
    /// # Errors
    ///
    /// As [`Self::bind`].
    pub fn bind_null(&mut self, name: &str, ty: Option<SqlType>, allow_rebind: bool) -> Result<()> {
        self.set(name, Binding::Null(ty.unwrap_or_default()), allow_rebind)
    }

    fn set(&mut self, name: &str, binding: Binding, allow_rebind: bool) -> Result<()> {
        let positions = self
            .template
            .positions(name)
            .ok_or_else(|| Error::UnknownParameter(name.to_owned()))?;

        if !allow_rebind && positions.iter().any(|&p| self.slots[p - 1].is_some()) {
            return Err(Error::AlreadyBound(name.to_owned()));
        }
        for &position in positions {
            self.slots[position - 1] = Some(binding.clone());
        }
        Ok(())
    }

    #[must_use]
    pub fn is_bound(&self, position: usize) -> bool {
        position
            .checked_sub(1)
            .and_then(|idx| self.slots.get(idx))
            .is_some_and(Option::is_some)
    }

    /// True when no position holds a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Names with at least one unbound position, in template order.
    #[must_use]
    pub fn unbound_names(&self) -> Vec<&str> {
        self.template
            .parameters()
            .iter()
            .filter(|param| param.positions().iter().any(|&p| self.slots[p - 1].is_none()))
            .map(|param| param.name())
            .collect()
    }

    /// # Errors
    ///
    /// [`Error::UnboundParameter`] listing every name still missing a value.
    pub fn ensure_complete(&self) -> Result<()> {
        let missing = self.unbound_names();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::UnboundParameter(
                missing.into_iter().map(str::to_owned).collect(),
            ))
        }
    }

    /// Forgets every value; the template is kept.
    pub fn reset(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    /// Sends every bound value to `statement`, position by position.
    ///
    /// Callers check [`Self::ensure_complete`] first.
    pub fn apply<S: Statement + ?Sized>(&self, statement: &mut S) -> std::result::Result<(), DriverError> {
        for (idx, slot) in self.slots.iter().enumerate() {
            let binding = slot
                .as_ref()
                .ok_or_else(|| DriverError::new(format!("parameter {} has no value", idx + 1)))?;
            statement.set_parameter(idx + 1, binding)?;
        }
        Ok(())
    }

    /// The current value of each name, for diagnostics.
    #[must_use]
    pub fn snapshot(&self) -> Vec<NamedBinding> {
        self.template
            .parameters()
            .iter()
            .map(|param| NamedBinding {
                name: param.name().to_owned(),
                value: param
                    .positions()
                    .first()
                    .and_then(|&p| self.slots[p - 1].clone()),
            })
            .collect()
    }
}
