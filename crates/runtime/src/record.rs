use crate::Value;

/// The result of invoking a method on a host record
#[derive(Debug)]
pub enum MethodOutcome {
    /// The record has no method with the requested name
    Missing,
    /// The method exists but was invoked with the wrong number of arguments
    ///
    /// `expected` counts the receiver, matching the host convention the VM
    /// reports in its warning.
    ArityMismatch {
        /// The arity the method declares, receiver included
        expected: usize,
    },
    /// The method ran for its side effects and returned nothing
    Unit,
    /// The method's first return value
    Value(Value),
}

/// Field lookup and method invocation on host values
///
/// Embedders implement this for the record-like values they place in the
/// [Stash](crate::Stash). It replaces runtime reflection: the host registers
/// the capability alongside the value, and the VM's `fetch_field_s` and
/// `methodcall` ops go through it.
///
/// Field names arrive with their first character upper-cased, matching the
/// convention for exported host fields.
pub trait TemplateRecord {
    /// The record's type name, used in diagnostics
    fn type_name(&self) -> &str;

    /// Returns the named field's value, or `None` when the field is absent
    fn field(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Invokes the named method with the given arguments
    ///
    /// `args` excludes the receiver. An implementation reporting
    /// [MethodOutcome::ArityMismatch] counts the receiver in `expected`.
    fn call_method(&self, _name: &str, _args: &[Value]) -> MethodOutcome {
        MethodOutcome::Missing
    }

    /// Custom stringification, consulted by the display coercion
    ///
    /// Records without one render as `<TypeName>`.
    fn display_string(&self) -> Option<String> {
        None
    }
}
