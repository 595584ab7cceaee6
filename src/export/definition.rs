use ahash::AHashMap;
use serde::{Deserialize, Deserializer, Serialize};

/// A flow object, which doubles as the flow's start page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub transition_routes: Vec<RouteDefinition>,
    #[serde(default)]
    pub event_handlers: Vec<RouteDefinition>,
    #[serde(default)]
    pub transition_route_groups: Vec<String>,
}

/// A single page file from a flow's `pages` directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_fulfillment: Option<FulfillmentDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form: Option<FormDefinition>,
    #[serde(default)]
    pub transition_routes: Vec<RouteDefinition>,
    #[serde(default)]
    pub event_handlers: Vec<RouteDefinition>,
    #[serde(default)]
    pub transition_route_groups: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDefinition {
    #[serde(default)]
    pub parameters: Vec<FormParameterDefinition>,
}

/// A form parameter, the owner of reprompt event handlers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormParameterDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_behavior: Option<FillBehaviorDefinition>,
}

impl FormParameterDefinition {
    pub fn reprompt_handlers(&self) -> &[RouteDefinition] {
        self.fill_behavior
            .as_ref()
            .map(|fb| fb.reprompt_event_handlers.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillBehaviorDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_prompt_fulfillment: Option<FulfillmentDefinition>,
    #[serde(default)]
    pub reprompt_event_handlers: Vec<RouteDefinition>,
}

/// A transition route, event handler or reprompt handler. They share one shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_page: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_flow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_fulfillment: Option<FulfillmentDefinition>,
}

impl RouteDefinition {
    /// The trigger fulfillment, treating an empty object as absent.
    pub fn fulfillment(&self) -> Option<&FulfillmentDefinition> {
        self.trigger_fulfillment.as_ref().filter(|f| !f.is_empty())
    }
}

/// The payload executed when a route, handler or entry fires.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentDefinition {
    #[serde(default)]
    pub messages: Vec<MessageDefinition>,
    #[serde(default)]
    pub set_parameter_actions: Vec<MessageDefinition>,
    /// Present whenever the key exists, even with a `null` value.
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub webhook: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl FulfillmentDefinition {
    pub fn has_webhook(&self) -> bool {
        self.webhook.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
            && self.set_parameter_actions.is_empty()
            && self.webhook.is_none()
            && self.tag.is_none()
    }
}

/// One response message or one parameter preset action.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextDefinition {
    #[serde(default)]
    pub text: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteGroupDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub transition_routes: Vec<RouteDefinition>,
}

/// Intent metadata, the `<intent>/<intent>.json` file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub labels: AHashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A webhook file from the agent's `webhooks` directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generic_web_service: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<TimeoutDefinition>,
}

impl WebhookDefinition {
    pub fn service_type(&self) -> &'static str {
        if self.generic_web_service.is_some() {
            "Generic Web Service"
        } else {
            "Other"
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeoutDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seconds: Option<u64>,
}

fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}
