use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::VerbParseError;

/// Remote operation applied to a hook definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookVerb {
    Fetch,
    Create,
    Update,
    Delete,
}

impl fmt::Display for HookVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HookVerb::Fetch => "fetch",
            HookVerb::Create => "create",
            HookVerb::Update => "update",
            HookVerb::Delete => "delete",
        };
        f.write_str(name)
    }
}

impl FromStr for HookVerb {
    type Err = VerbParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fetch" | "get" => Ok(HookVerb::Fetch),
            "create" | "post" => Ok(HookVerb::Create),
            "update" | "put" => Ok(HookVerb::Update),
            "delete" => Ok(HookVerb::Delete),
            _ => Err(VerbParseError::UnsupportedOperation(s.to_string())),
        }
    }
}

/// Lifecycle event a trigger fires on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TriggerType {
    BeforeSave,
    AfterSave,
    BeforeDelete,
    AfterDelete,
    BeforeFind,
    AfterFind,
    BeforeLogin,
    AfterLogin,
    BeforeLogout,
    AfterLogout,
    BeforeSaveFile,
    AfterSaveFile,
    BeforeDeleteFile,
    AfterDeleteFile,
    BeforeConnect,
    BeforeSubscribe,
    AfterEvent,
}

impl TriggerType {
    pub const ALL: [TriggerType; 17] = [
        TriggerType::BeforeSave,
        TriggerType::AfterSave,
        TriggerType::BeforeDelete,
        TriggerType::AfterDelete,
        TriggerType::BeforeFind,
        TriggerType::AfterFind,
        TriggerType::BeforeLogin,
        TriggerType::AfterLogin,
        TriggerType::BeforeLogout,
        TriggerType::AfterLogout,
        TriggerType::BeforeSaveFile,
        TriggerType::AfterSaveFile,
        TriggerType::BeforeDeleteFile,
        TriggerType::AfterDeleteFile,
        TriggerType::BeforeConnect,
        TriggerType::BeforeSubscribe,
        TriggerType::AfterEvent,
    ];

    /// Wire name used by the backend (`beforeSave`, `afterSaveFile`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerType::BeforeSave => "beforeSave",
            TriggerType::AfterSave => "afterSave",
            TriggerType::BeforeDelete => "beforeDelete",
            TriggerType::AfterDelete => "afterDelete",
            TriggerType::BeforeFind => "beforeFind",
            TriggerType::AfterFind => "afterFind",
            TriggerType::BeforeLogin => "beforeLogin",
            TriggerType::AfterLogin => "afterLogin",
            TriggerType::BeforeLogout => "beforeLogout",
            TriggerType::AfterLogout => "afterLogout",
            TriggerType::BeforeSaveFile => "beforeSaveFile",
            TriggerType::AfterSaveFile => "afterSaveFile",
            TriggerType::BeforeDeleteFile => "beforeDeleteFile",
            TriggerType::AfterDeleteFile => "afterDeleteFile",
            TriggerType::BeforeConnect => "beforeConnect",
            TriggerType::BeforeSubscribe => "beforeSubscribe",
            TriggerType::AfterEvent => "afterEvent",
        }
    }

    /// Reserved pseudo-class for triggers that are not scoped to an object class
    pub fn implicit_class(&self) -> Option<&'static str> {
        match self {
            TriggerType::BeforeSaveFile
            | TriggerType::AfterSaveFile
            | TriggerType::BeforeDeleteFile
            | TriggerType::AfterDeleteFile => Some(FILE_CLASS),
            TriggerType::BeforeConnect => Some(CONNECT_CLASS),
            _ => None,
        }
    }
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriggerType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TriggerType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow::anyhow!("Unknown trigger type: {}", s))
    }
}

pub const FILE_CLASS: &str = "@File";
pub const CONNECT_CLASS: &str = "@Connect";

/// Named cloud function pointing at a callback URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookFunction {
    #[serde(rename = "functionName")]
    pub name: String,
    pub url: String,
}

impl HookFunction {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Identity of a trigger on a server: at most one per (class, type)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TriggerKey {
    pub class_name: Option<String>,
    pub trigger_type: TriggerType,
}

impl fmt::Display for TriggerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.class_name {
            Some(class) => write!(f, "{}.{}", class, self.trigger_type),
            None => write!(f, "{}", self.trigger_type),
        }
    }
}

/// Object or lifecycle trigger pointing at a callback URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookTrigger {
    #[serde(rename = "className", default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(rename = "triggerName")]
    pub trigger_type: TriggerType,
    pub url: String,
}

impl HookTrigger {
    pub fn new(class_name: Option<&str>, trigger_type: TriggerType, url: impl Into<String>) -> Self {
        Self {
            class_name: class_name.map(str::to_string),
            trigger_type,
            url: url.into(),
        }
    }

    pub fn key(&self) -> TriggerKey {
        TriggerKey {
            class_name: self.class_name.clone(),
            trigger_type: self.trigger_type,
        }
    }

    /// Class name as sent to the backend, falling back to the reserved pseudo-class
    pub fn wire_class(&self) -> Option<&str> {
        self.class_name
            .as_deref()
            .or_else(|| self.trigger_type.implicit_class())
    }

    /// Drop a pseudo-class echoed back by the backend so identities compare equal
    pub fn normalized(mut self) -> Self {
        if self.class_name.as_deref() == self.trigger_type.implicit_class() {
            self.class_name = None;
        }
        self
    }
}

/// Kind of hook resource on the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    Function,
    Trigger,
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookKind::Function => f.write_str("function"),
            HookKind::Trigger => f.write_str("trigger"),
        }
    }
}

/// A hook definition of either kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hook {
    Function(HookFunction),
    Trigger(HookTrigger),
}

impl Hook {
    pub fn kind(&self) -> HookKind {
        match self {
            Hook::Function(_) => HookKind::Function,
            Hook::Trigger(_) => HookKind::Trigger,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Hook::Function(f) => &f.url,
            Hook::Trigger(t) => &t.url,
        }
    }

    /// Same definition pointed at a different callback URL
    pub fn with_url(&self, url: impl Into<String>) -> Hook {
        match self {
            Hook::Function(f) => Hook::Function(HookFunction::new(f.name.clone(), url)),
            Hook::Trigger(t) => Hook::Trigger(HookTrigger {
                url: url.into(),
                ..t.clone()
            }),
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hook::Function(func) => write!(f, "function:{}", func.name),
            Hook::Trigger(trigger) => write!(f, "trigger:{}", trigger.key()),
        }
    }
}

impl From<HookFunction> for Hook {
    fn from(f: HookFunction) -> Self {
        Hook::Function(f)
    }
}

impl From<HookTrigger> for Hook {
    fn from(t: HookTrigger) -> Self {
        Hook::Trigger(t)
    }
}
