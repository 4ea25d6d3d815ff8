use super::context::*;
use super::module::*;
use super::param::*;

use crate::error::Error;

use log::debug;

/// Signature of a [`ModuleTemplate`] generator: builds a fresh [`Module`] in the given [`Context`] from validated arguments.
///
/// [`Context`]: ./struct.Context.html
/// [`Module`]: ./struct.Module.html
/// [`ModuleTemplate`]: ./struct.ModuleTemplate.html
pub type Generator =
    for<'b, 't> fn(&'b Context<'b>, &BoundArgs<'t>) -> Result<&'b Module<'b>, Error>;

/// A parameterized [`Module`] generator.
///
/// A template declares an ordered list of type parameters, a kind constraint for any of them, and a [`Generator`] function. [`instantiate`] checks the supplied arguments against the constraints before calling the generator, and names the produced module after the instance.
///
/// # Examples
///
/// ```
/// use rtlgen::*;
///
/// fn generate<'a>(c: &'a Context<'a>, args: &BoundArgs) -> Result<&'a Module<'a>, Error> {
///     let width = args.width("WIDTH")?;
///     let m = c.module("Passthrough");
///     let i = m.input("i", width);
///     let o = m.output("o", width);
///     m.assign(o, i);
///     m.set_parameter("WIDTH", Param::Width(width));
///     Ok(m)
/// }
///
/// # fn main() -> Result<(), Error> {
/// let template = ModuleTemplate::new("Passthrough", &["WIDTH"])
///     .constraint("WIDTH", ParamKind::Width)
///     .generator(generate);
///
/// let c = Context::new();
/// let m = template.instantiate(&c, "pass8", &TemplateArgs::new().with("WIDTH", Param::Width(8)))?;
///
/// assert_eq!(m.name(), "pass8");
/// assert_eq!(m.parameters().get("WIDTH"), Some(&Param::Width(8)));
///
/// let err = template.instantiate(&c, "pass", &TemplateArgs::new()).unwrap_err();
/// assert!(matches!(err, Error::MissingTemplateArgument { .. }));
/// # Ok(())
/// # }
/// ```
///
/// [`Generator`]: ./type.Generator.html
/// [`instantiate`]: #method.instantiate
/// [`Module`]: ./struct.Module.html
#[derive(Clone)]
pub struct ModuleTemplate {
    name: String,
    type_params: Vec<String>,
    constraints: Vec<(String, ParamKind)>,
    generator: Option<Generator>,
}

impl ModuleTemplate {
    /// Creates a template called `name` with the given type parameters, no constraints and no generator.
    pub fn new<S: Into<String>>(name: S, type_params: &[&str]) -> ModuleTemplate {
        ModuleTemplate {
            name: name.into(),
            type_params: type_params.iter().map(|p| p.to_string()).collect(),
            constraints: Vec::new(),
            generator: None,
        }
    }

    /// Requires the argument for `param` to be of kind `kind`. Constraining a parameter again replaces its kind.
    pub fn constraint<S: Into<String>>(mut self, param: S, kind: ParamKind) -> ModuleTemplate {
        let param = param.into();
        match self.constraints.iter_mut().find(|(p, _)| *p == param) {
            Some(entry) => entry.1 = kind,
            None => self.constraints.push((param, kind)),
        }
        self
    }

    /// Sets the function that builds this template's modules.
    pub fn generator(mut self, generator: Generator) -> ModuleTemplate {
        self.generator = Some(generator);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_params(&self) -> &[String] {
        &self.type_params
    }

    /// Returns the constraint on `param`, if any.
    pub fn constraint_on(&self, param: &str) -> Option<ParamKind> {
        self.constraints
            .iter()
            .find(|(p, _)| p == param)
            .map(|(_, kind)| *kind)
    }

    /// Produces a new [`Module`] in `context` from `args`, named `instance_name`.
    ///
    /// Constraints are checked in the order they were declared. The template itself is left untouched.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingTemplateArgument`] if a constrained parameter has no argument.
    /// - [`Error::TemplateKindMismatch`] if an argument's kind differs from its constraint.
    /// - [`Error::MissingGenerator`] if no generator was set.
    /// - Any error returned by the generator itself.
    ///
    /// [`Error::MissingGenerator`]: ./error/enum.Error.html#variant.MissingGenerator
    /// [`Error::MissingTemplateArgument`]: ./error/enum.Error.html#variant.MissingTemplateArgument
    /// [`Error::TemplateKindMismatch`]: ./error/enum.Error.html#variant.TemplateKindMismatch
    /// [`Module`]: ./struct.Module.html
    pub fn instantiate<'a, S: Into<String>>(
        &self,
        context: &'a Context<'a>,
        instance_name: S,
        args: &TemplateArgs,
    ) -> Result<&'a Module<'a>, Error> {
        let bound = BoundArgs {
            template: &self.name,
            args,
        };
        for (param, kind) in &self.constraints {
            bound.expect(param, *kind)?;
        }
        let generator = self.generator.ok_or_else(|| Error::MissingGenerator {
            template: self.name.clone(),
        })?;

        let module = generator(context, &bound)?;
        let instance_name = instance_name.into();
        debug!(
            "instantiated template \"{}\" as \"{}\"",
            self.name, instance_name
        );
        module.rename(instance_name);
        Ok(module)
    }
}

/// Template arguments as seen by a [`Generator`], with typed accessors that report errors against the template's name.
///
/// [`Generator`]: ./type.Generator.html
pub struct BoundArgs<'t> {
    template: &'t str,
    args: &'t TemplateArgs,
}

impl<'t> BoundArgs<'t> {
    /// Name of the template being instantiated.
    pub fn template(&self) -> &str {
        self.template
    }

    /// All supplied arguments, including ones without a constraint.
    pub fn args(&self) -> &TemplateArgs {
        self.args
    }

    /// Returns the argument for `param`.
    pub fn get(&self, param: &str) -> Result<Param, Error> {
        self.args
            .get(param)
            .copied()
            .ok_or_else(|| Error::MissingTemplateArgument {
                template: self.template.to_string(),
                param: param.to_string(),
            })
    }

    /// Builds the error a generator returns when it can't use `value` for `param`.
    pub fn invalid<P: Into<Param>, S: Into<String>>(&self, param: &str, value: P, reason: S) -> Error {
        Error::InvalidTemplateArgument {
            template: self.template.to_string(),
            param: param.to_string(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    fn mismatch(&self, param: &str, expected: ParamKind, actual: &Param) -> Error {
        Error::TemplateKindMismatch {
            template: self.template.to_string(),
            param: param.to_string(),
            expected,
            actual: actual.kind(),
        }
    }

    fn expect(&self, param: &str, expected: ParamKind) -> Result<Param, Error> {
        let value = self.get(param)?;
        if value.kind() != expected {
            return Err(self.mismatch(param, expected, &value));
        }
        Ok(value)
    }

    /// Returns the [`Param::Width`](./enum.Param.html#variant.Width) argument for `param`.
    pub fn width(&self, param: &str) -> Result<u32, Error> {
        match self.get(param)? {
            Param::Width(value) => Ok(value),
            other => Err(self.mismatch(param, ParamKind::Width, &other)),
        }
    }

    /// Returns the [`Param::Int`](./enum.Param.html#variant.Int) argument for `param`.
    pub fn int(&self, param: &str) -> Result<i64, Error> {
        match self.get(param)? {
            Param::Int(value) => Ok(value),
            other => Err(self.mismatch(param, ParamKind::Int, &other)),
        }
    }

    /// Returns the [`Param::Bool`](./enum.Param.html#variant.Bool) argument for `param`.
    pub fn boolean(&self, param: &str) -> Result<bool, Error> {
        match self.get(param)? {
            Param::Bool(value) => Ok(value),
            other => Err(self.mismatch(param, ParamKind::Bool, &other)),
        }
    }
}

impl<'a> Module<'a> {
    /// Instantiates `template` into this `Module`'s [`Context`] under `instance_name`.
    ///
    /// Equivalent to [`ModuleTemplate::instantiate`] with this `Module`'s [`Context`]. The produced module is independent of this one; use [`instance`](#method.instance) to place it.
    ///
    /// [`Context`]: ./struct.Context.html
    /// [`ModuleTemplate::instantiate`]: ./struct.ModuleTemplate.html#method.instantiate
    pub fn instantiate_template<S: Into<String>>(
        &self,
        template: &ModuleTemplate,
        instance_name: S,
        args: &TemplateArgs,
    ) -> Result<&'a Module<'a>, Error> {
        template.instantiate(self.context, instance_name, args)
    }
}

#[cfg(test)]
mod tests {
    use crate::*;

    fn counter<'a>(c: &'a Context<'a>, args: &BoundArgs) -> Result<&'a Module<'a>, Error> {
        let width = args.width("WIDTH")?;
        let wrap = args.boolean("WRAP")?;
        let m = c.module("Counter");
        let _ = m.reg("count", width);
        m.set_parameter("WIDTH", Param::Width(width));
        m.set_parameter("WRAP", wrap);
        Ok(m)
    }

    fn needs_limit<'a>(c: &'a Context<'a>, args: &BoundArgs) -> Result<&'a Module<'a>, Error> {
        let _ = args.int("LIMIT")?;
        Ok(c.module("Limited"))
    }

    fn counter_template() -> ModuleTemplate {
        ModuleTemplate::new("Counter", &["WIDTH", "WRAP"])
            .constraint("WIDTH", ParamKind::Width)
            .constraint("WRAP", ParamKind::Bool)
            .generator(counter)
    }

    #[test]
    fn instantiate_stores_arguments() {
        let c = Context::new();

        let args = TemplateArgs::new()
            .with("WIDTH", Param::Width(12))
            .with("WRAP", true);
        let m = counter_template().instantiate(&c, "cnt12", &args).unwrap();

        assert_eq!(m.name(), "cnt12");
        assert_eq!(m.parameters(), args);
        assert_eq!(m.regs()[0].bit_width(), 12);
        assert_eq!(c.modules().len(), 1);
    }

    #[test]
    fn missing_argument() {
        let c = Context::new();

        let args = TemplateArgs::new().with("WIDTH", Param::Width(12));
        let err = counter_template().instantiate(&c, "x", &args).unwrap_err();

        assert_eq!(
            err.to_string(),
            "missing type argument for parameter \"WRAP\" of template \"Counter\""
        );
        assert!(c.modules().is_empty());
    }

    #[test]
    fn kind_mismatch() {
        let c = Context::new();

        let args = TemplateArgs::new().with("WIDTH", 12).with("WRAP", true);
        let err = counter_template().instantiate(&c, "x", &args).unwrap_err();

        match err {
            Error::TemplateKindMismatch {
                template,
                param,
                expected,
                actual,
            } => {
                assert_eq!(template, "Counter");
                assert_eq!(param, "WIDTH");
                assert_eq!(expected, ParamKind::Width);
                assert_eq!(actual, ParamKind::Int);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn constraints_checked_in_declaration_order() {
        let c = Context::new();

        let err = counter_template()
            .instantiate(&c, "x", &TemplateArgs::new())
            .unwrap_err();

        assert!(matches!(err, Error::MissingTemplateArgument { ref param, .. } if param == "WIDTH"));
    }

    #[test]
    fn missing_generator() {
        let c = Context::new();

        let template = ModuleTemplate::new("Empty", &[]);
        let err = template.instantiate(&c, "x", &TemplateArgs::new()).unwrap_err();

        assert!(matches!(err, Error::MissingGenerator { ref template } if template == "Empty"));
    }

    #[test]
    fn generator_errors_propagate() {
        let c = Context::new();

        // LIMIT isn't constrained, so only the generator notices it's missing
        let template = ModuleTemplate::new("Limited", &["LIMIT"]).generator(needs_limit);
        let err = template.instantiate(&c, "x", &TemplateArgs::new()).unwrap_err();
        assert!(matches!(err, Error::MissingTemplateArgument { .. }));

        let m = c.module("Top");
        let limited = m
            .instantiate_template(&template, "lim", &TemplateArgs::new().with("LIMIT", 4))
            .unwrap();
        assert_eq!(limited.name(), "lim");
    }

    #[test]
    fn instantiation_leaves_template_untouched() {
        let c = Context::new();

        let template = counter_template();
        let args = TemplateArgs::new()
            .with("WIDTH", Param::Width(4))
            .with("WRAP", false);
        let a = template.instantiate(&c, "a", &args).unwrap();
        let b = template.instantiate(&c, "b", &args).unwrap();

        assert_eq!(template.name(), "Counter");
        assert_eq!(template.type_params(), ["WIDTH", "WRAP"]);
        assert_eq!(template.constraint_on("WRAP"), Some(ParamKind::Bool));
        assert_eq!(a.name(), "a");
        assert_eq!(b.name(), "b");
    }
}
