use std::fmt;

/// A parameter value, as stored on [`Module`]s and [`Instance`]s and passed as a [`ModuleTemplate`] argument.
///
/// [`Instance`]: ./struct.Instance.html
/// [`Module`]: ./struct.Module.html
/// [`ModuleTemplate`]: ./struct.ModuleTemplate.html
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Param {
    /// A bit width
    Width(u32),
    /// A plain integer (depths, counts, etc.)
    Int(i64),
    /// A boolean flag, rendered as `1`/`0`
    Bool(bool),
}

impl Param {
    /// Returns the kind of this value, for checking against template constraints.
    pub fn kind(&self) -> ParamKind {
        match self {
            Param::Width(_) => ParamKind::Width,
            Param::Int(_) => ParamKind::Int,
            Param::Bool(_) => ParamKind::Bool,
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Param::Width(value) => write!(f, "{}", value),
            Param::Int(value) => write!(f, "{}", value),
            Param::Bool(value) => write!(f, "{}", if value { 1 } else { 0 }),
        }
    }
}

impl From<i64> for Param {
    fn from(value: i64) -> Self {
        Param::Int(value)
    }
}

impl From<i32> for Param {
    fn from(value: i32) -> Self {
        Param::Int(value.into())
    }
}

impl From<bool> for Param {
    fn from(value: bool) -> Self {
        Param::Bool(value)
    }
}

/// The kind a template constraint requires of its argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    Width,
    Int,
    Bool,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParamKind::Width => "width",
            ParamKind::Int => "int",
            ParamKind::Bool => "bool",
        })
    }
}

/// An insertion-ordered map from parameter names to [`Param`] values.
///
/// Setting a name that's already present replaces its value in place, keeping its original position.
///
/// # Examples
///
/// ```
/// use rtlgen::*;
///
/// let args = ParamMap::new()
///     .with("DATA_WIDTH", Param::Width(8))
///     .with("DEPTH", 16)
///     .with("DATA_WIDTH", Param::Width(32));
///
/// assert_eq!(args.len(), 2);
/// assert_eq!(args.get("DATA_WIDTH"), Some(&Param::Width(32)));
/// ```
///
/// [`Param`]: ./enum.Param.html
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamMap {
    entries: Vec<(String, Param)>,
}

/// Arguments for [`ModuleTemplate::instantiate`](./struct.ModuleTemplate.html#method.instantiate).
pub type TemplateArgs = ParamMap;

impl ParamMap {
    pub fn new() -> ParamMap {
        ParamMap {
            entries: Vec::new(),
        }
    }

    /// Sets `name` to `value`.
    pub fn insert<S: Into<String>, P: Into<Param>>(&mut self, name: S, value: P) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Builder-style variant of [`insert`](#method.insert).
    pub fn with<S: Into<String>, P: Into<Param>>(mut self, name: S, value: P) -> ParamMap {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Param> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Param)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_order_is_kept() {
        let mut map = ParamMap::new();
        map.insert("Z", 1);
        map.insert("A", 2);
        map.insert("M", Param::Width(3));

        let names = map.iter().map(|(n, _)| n).collect::<Vec<_>>();
        assert_eq!(names, vec!["Z", "A", "M"]);
    }

    #[test]
    fn reinsert_replaces_in_place() {
        let mut map = ParamMap::new();
        map.insert("A", 1);
        map.insert("B", 2);
        map.insert("A", true);

        let entries = map.iter().collect::<Vec<_>>();
        assert_eq!(entries, vec![("A", &Param::Bool(true)), ("B", &Param::Int(2))]);
    }

    #[test]
    fn display() {
        assert_eq!(Param::Width(8).to_string(), "8");
        assert_eq!(Param::Int(-3).to_string(), "-3");
        assert_eq!(Param::Bool(true).to_string(), "1");
        assert_eq!(Param::Bool(false).to_string(), "0");
    }

    #[test]
    fn kinds() {
        assert_eq!(Param::Width(1).kind(), ParamKind::Width);
        assert_eq!(Param::from(5).kind(), ParamKind::Int);
        assert_eq!(Param::from(false).kind(), ParamKind::Bool);
    }
}
