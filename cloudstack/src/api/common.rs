//! Common types shared by every CloudStack service

use regex::Regex;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Special ID CloudStack uses for an unlimited resource.
pub const UNLIMITED_RESOURCE_ID: &str = "-1";

/// Keys the dispatcher injects itself.
pub const RESERVED_KEYS: [&str; 4] = ["apiKey", "command", "response", "signature"];

/// Returns true if `id` is a UUID or [`UNLIMITED_RESOURCE_ID`].
pub fn is_id(id: &str) -> bool {
    static ID_REGEX: OnceLock<Regex> = OnceLock::new();
    ID_REGEX
        .get_or_init(|| {
            Regex::new(
                r"^([0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}|-1)$",
            )
            .expect("ID pattern is a valid regex")
        })
        .is_match(id)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    String(String),
    Int(i64),
    Bool(bool),
    List(Vec<String>),
    Map(BTreeMap<String, String>),
}

/// Request parameters for a single API call.
///
/// Values are stored typed and only flattened to strings by [`ParamBag::to_wire`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamBag {
    params: BTreeMap<String, ParamValue>,
}

impl ParamBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) -> &mut Self {
        self.params
            .insert(key.into(), ParamValue::String(value.into()));
        self
    }

    pub fn set_int<K: Into<String>>(&mut self, key: K, value: i32) -> &mut Self {
        self.params
            .insert(key.into(), ParamValue::Int(i64::from(value)));
        self
    }

    pub fn set_int64<K: Into<String>>(&mut self, key: K, value: i64) -> &mut Self {
        self.params.insert(key.into(), ParamValue::Int(value));
        self
    }

    pub fn set_bool<K: Into<String>>(&mut self, key: K, value: bool) -> &mut Self {
        self.params.insert(key.into(), ParamValue::Bool(value));
        self
    }

    pub fn set_list<K, I, S>(&mut self, key: K, values: I) -> &mut Self
    where
        K: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params.insert(
            key.into(),
            ParamValue::List(values.into_iter().map(Into::into).collect()),
        );
        self
    }

    pub fn set_map<K, I, MK, MV>(&mut self, key: K, entries: I) -> &mut Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (MK, MV)>,
        MK: Into<String>,
        MV: Into<String>,
    {
        self.params.insert(
            key.into(),
            ParamValue::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        );
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.params.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.params.get(key) {
            Some(ParamValue::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.params.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Flattens every value into its wire form, sorted by key.
    ///
    /// Lists are joined with commas and maps become `name[i].key` /
    /// `name[i].value` pairs indexed in the map's key order.
    pub fn to_wire(&self) -> BTreeMap<String, String> {
        let mut wire = BTreeMap::new();
        for (key, value) in &self.params {
            match value {
                ParamValue::String(s) => {
                    wire.insert(key.clone(), s.clone());
                }
                ParamValue::Int(i) => {
                    wire.insert(key.clone(), i.to_string());
                }
                ParamValue::Bool(b) => {
                    wire.insert(key.clone(), b.to_string());
                }
                ParamValue::List(items) => {
                    wire.insert(key.clone(), items.join(","));
                }
                ParamValue::Map(map) => {
                    for (i, (k, v)) in map.iter().enumerate() {
                        wire.insert(format!("{}[{}].key", key, i), k.clone());
                        wire.insert(format!("{}[{}].value", key, i), v.clone());
                    }
                }
            }
        }
        wire
    }
}

/// Parameter object for a single API command.
///
/// The capability accessors let option hooks reach ID fields on parameter
/// types that have them; types without the field keep the `None` default
/// and hooks skip them.
pub trait ApiParams: Send + Sync {
    fn to_params(&self) -> ParamBag;

    fn domain_id_setter(&mut self) -> Option<&mut dyn SetDomainId> {
        None
    }

    fn project_id_setter(&mut self) -> Option<&mut dyn SetProjectId> {
        None
    }

    fn zone_id_setter(&mut self) -> Option<&mut dyn SetZoneId> {
        None
    }

    fn vpc_id_setter(&mut self) -> Option<&mut dyn SetVpcId> {
        None
    }
}

impl ApiParams for ParamBag {
    fn to_params(&self) -> ParamBag {
        self.clone()
    }
}

pub trait SetDomainId: Send + Sync {
    fn set_domain_id(&mut self, id: String);
}

pub trait SetProjectId: Send + Sync {
    fn set_project_id(&mut self, id: String);
}

pub trait SetZoneId: Send + Sync {
    fn set_zone_id(&mut self, id: String);
}

pub trait SetVpcId: Send + Sync {
    fn set_vpc_id(&mut self, id: String);
}

/// Generic `{"success": ...}` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SuccessResponse {
    #[serde(default, deserialize_with = "deserialize_cloudstack_bool")]
    pub success: bool,
    #[serde(default)]
    pub displaytext: String,
}

/// CloudStack sends some booleans as strings.
pub fn deserialize_cloudstack_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Bool(b) => Ok(b),
        BoolOrString::String(s) => s
            .parse::<bool>()
            .map_err(|_| serde::de::Error::custom(format!("expected true or false, got {}", s))),
    }
}

/// Picks the ID matching `name` out of a list lookup.
pub(crate) fn pick_id<'a, I>(name: &str, count: usize, candidates: I) -> crate::api::Result<String>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    use crate::api::ApiError;

    let mut candidates = candidates.into_iter();
    match count {
        0 => Err(ApiError::NotFound(name.to_string())),
        1 => candidates
            .next()
            .map(|(id, _)| id.to_string())
            .ok_or_else(|| ApiError::NotFound(name.to_string())),
        _ => candidates
            .find(|(_, candidate)| *candidate == name)
            .map(|(id, _)| id.to_string())
            .ok_or_else(|| ApiError::AmbiguousName(name.to_string())),
    }
}
