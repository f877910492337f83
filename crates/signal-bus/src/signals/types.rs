use std::any::TypeId;
use std::fmt::{self, Debug, Display};
use std::hash::{Hash, Hasher};
use serde::{Serialize, Deserialize};

/// Priority of a subscriber within a binding. Higher values run first.
pub type Priority = i32;

/// Marker trait for values that can be emitted on the bus.
///
/// Any `Send + Sync + 'static` type is a signal; the payload's type is its
/// identity on the bus.
pub trait Signal: Send + Sync + 'static {}

impl<T: Send + Sync + 'static> Signal for T {}

/// Type identity of a declared signal.
///
/// Equality and hashing only consider the [`TypeId`]; the name is kept for
/// diagnostics.
#[derive(Clone, Copy)]
pub struct SignalKind {
    id: TypeId,
    type_name: &'static str,
}

impl SignalKind {
    /// Identity of the signal type `S`
    pub fn of<S: Signal>() -> Self {
        Self {
            id: TypeId::of::<S>(),
            type_name: std::any::type_name::<S>(),
        }
    }

    /// The underlying type id
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Type name without its module path, e.g. `PlayerJoined` for
    /// `game::events::PlayerJoined` or `Wrapper<Inner>` for generics.
    /// Tuples and arrays keep their full name.
    pub fn name(&self) -> &'static str {
        if self.type_name.starts_with(['(', '[']) {
            return self.type_name;
        }
        let base = match self.type_name.find('<') {
            Some(generic_start) => &self.type_name[..generic_start],
            None => self.type_name,
        };
        match base.rfind("::") {
            Some(idx) => &self.type_name[idx + 2..],
            None => self.type_name,
        }
    }
}

impl PartialEq for SignalKind {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SignalKind {}

impl Hash for SignalKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Debug for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SignalKind").field(&self.type_name).finish()
    }
}

impl Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How subscribers of a binding are invoked when its signal is emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BindingStyle {
    /// Callbacks run one after another on the emitting thread
    #[default]
    Sync,
    /// Each callback's future is spawned as a tokio task and awaited as a set
    AsyncTask,
    /// Each callback's future is polled on the emitting task and awaited as a set
    AsyncLightweight,
}

impl BindingStyle {
    /// All styles, in declaration order
    pub const ALL: [BindingStyle; 3] = [
        BindingStyle::Sync,
        BindingStyle::AsyncTask,
        BindingStyle::AsyncLightweight,
    ];

    /// Whether dispatch for this style must be awaited
    pub fn is_async(&self) -> bool {
        !matches!(self, BindingStyle::Sync)
    }

    /// Name used in configuration files and environment variables
    pub fn as_str(&self) -> &'static str {
        match self {
            BindingStyle::Sync => "sync",
            BindingStyle::AsyncTask => "async_task",
            BindingStyle::AsyncLightweight => "async_lightweight",
        }
    }
}

impl Display for BindingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BindingStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BindingStyle::ALL
            .into_iter()
            .find(|style| style.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown binding style '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod nested {
        pub struct ScoreChanged;
        pub struct Envelope<T>(pub T);
    }

    #[test]
    fn test_kind_identity() {
        assert_eq!(SignalKind::of::<nested::ScoreChanged>(), SignalKind::of::<nested::ScoreChanged>());
        assert_ne!(SignalKind::of::<nested::ScoreChanged>(), SignalKind::of::<u32>());
    }

    #[test]
    fn test_kind_short_name() {
        assert_eq!(SignalKind::of::<nested::ScoreChanged>().name(), "ScoreChanged");
        assert_eq!(SignalKind::of::<u32>().name(), "u32");
        assert!(SignalKind::of::<nested::Envelope<u32>>().name().starts_with("Envelope<"));
        assert!(SignalKind::of::<nested::ScoreChanged>().type_name().ends_with("nested::ScoreChanged"));
    }

    #[test]
    fn test_kind_name_of_tuples_and_arrays() {
        let pair = SignalKind::of::<(nested::ScoreChanged, u8)>();
        assert_eq!(pair.name(), pair.type_name());
        assert!(pair.name().starts_with('(') && pair.name().ends_with(", u8)"));

        let batch = SignalKind::of::<[nested::ScoreChanged; 2]>();
        assert_eq!(batch.name(), batch.type_name());
        assert!(batch.name().ends_with("ScoreChanged; 2]"));
    }

    #[test]
    fn test_style_parsing() {
        assert_eq!("sync".parse::<BindingStyle>().unwrap(), BindingStyle::Sync);
        assert_eq!(" ASYNC_TASK ".parse::<BindingStyle>().unwrap(), BindingStyle::AsyncTask);
        assert_eq!(
            "async_lightweight".parse::<BindingStyle>().unwrap(),
            BindingStyle::AsyncLightweight
        );
        assert!("uni_task".parse::<BindingStyle>().is_err());
        assert_eq!(BindingStyle::default(), BindingStyle::Sync);
        assert!(BindingStyle::AsyncTask.is_async());
        assert!(!BindingStyle::Sync.is_async());
    }

    #[test]
    fn test_style_serde_names() {
        let json = serde_json::to_string(&BindingStyle::AsyncLightweight).unwrap();
        assert_eq!(json, "\"async_lightweight\"");
        let style: BindingStyle = serde_json::from_str("\"async_task\"").unwrap();
        assert_eq!(style, BindingStyle::AsyncTask);
    }
}
