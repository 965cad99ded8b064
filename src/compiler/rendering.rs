use super::builder::RouteTable;
use crate::document::{Action, RenderedOption, StepContent};
use crate::error::{CompileError, StepViolation};
use crate::graph::SourcePort;
use crate::step::{Step, StepKind, StepPayload};
use ahash::AHashMap;

/// Defines the contract for rendering one kind of step into document content.
///
/// Register an implementation with
/// [`CompilerBuilder::with_custom_renderer`](super::CompilerBuilder::with_custom_renderer)
/// to replace the built-in rendering of its kind.
pub trait StepRenderer: Send + Sync {
    fn kind(&self) -> StepKind;
    fn render(&self, step: &Step, ctx: &RenderContext<'_>) -> Result<StepContent, CompileError>;
}

/// Where the step being rendered sits, and what its ports route to.
pub struct RenderContext<'a> {
    node_id: &'a str,
    step_index: usize,
    routes: &'a RouteTable<'a>,
    continue_label: &'a str,
}

impl<'a> RenderContext<'a> {
    pub(super) fn new(
        node_id: &'a str,
        step_index: usize,
        routes: &'a RouteTable<'a>,
        continue_label: &'a str,
    ) -> Self {
        Self {
            node_id,
            step_index,
            routes,
            continue_label,
        }
    }

    pub fn node_id(&self) -> &str {
        self.node_id
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn continue_label(&self) -> &str {
        self.continue_label
    }

    /// The node a port of the current node routes to.
    pub fn target(&self, port: SourcePort) -> Option<&str> {
        self.routes.target(self.node_id, port)
    }

    /// A navigate action for `port`, or `None` if the port is unconnected.
    pub fn transition(&self, port: SourcePort, label: &str) -> Option<Action> {
        self.target(port).map(|next| Action::Navigate {
            label: label.to_string(),
            next: next.to_string(),
        })
    }

    /// Error for a step whose payload does not match its kind.
    pub fn mismatch(&self, step: &Step) -> CompileError {
        CompileError::InvalidStepPayload {
            node_id: self.node_id.to_string(),
            index: self.step_index,
            violations: vec![StepViolation::PayloadMismatch {
                kind: step.kind,
                found: step.payload.shape(),
            }],
        }
    }
}

fn render_message(_step: &Step, _ctx: &RenderContext<'_>) -> Result<StepContent, CompileError> {
    Ok(StepContent::Message)
}

fn render_media(step: &Step, ctx: &RenderContext<'_>) -> Result<StepContent, CompileError> {
    match &step.payload {
        StepPayload::Media(media) => Ok(StepContent::Media {
            media_id: media.media_id.clone(),
        }),
        _ => Err(ctx.mismatch(step)),
    }
}

fn render_location(step: &Step, ctx: &RenderContext<'_>) -> Result<StepContent, CompileError> {
    match &step.payload {
        StepPayload::Location(location) => Ok(StepContent::Location {
            latitude: location.latitude.clone(),
            longitude: location.longitude.clone(),
            name: location.name.clone(),
            address: location.address.clone(),
        }),
        _ => Err(ctx.mismatch(step)),
    }
}

fn render_link(step: &Step, ctx: &RenderContext<'_>) -> Result<StepContent, CompileError> {
    match &step.payload {
        StepPayload::Link(link) => Ok(StepContent::Link {
            url: link.url.clone(),
            label: link.label.clone(),
        }),
        _ => Err(ctx.mismatch(step)),
    }
}

fn render_choices(step: &Step, ctx: &RenderContext<'_>) -> Result<StepContent, CompileError> {
    let (button_label, entries): (Option<String>, Vec<(String, Option<String>)>) =
        match (step.kind, &step.payload) {
            (StepKind::QuickReply, StepPayload::QuickReply(reply)) => (
                None,
                reply
                    .buttons
                    .iter()
                    .map(|b| (b.label.clone(), None))
                    .collect(),
            ),
            (StepKind::ListMenu, StepPayload::ListMenu(list)) => (
                Some(list.button_label.clone()),
                list.options
                    .iter()
                    .map(|o| (o.title.clone(), o.description.clone()))
                    .collect(),
            ),
            _ => return Err(ctx.mismatch(step)),
        };

    let options = entries
        .into_iter()
        .enumerate()
        .map(|(option, (title, description))| {
            let port = SourcePort::Option {
                step: ctx.step_index(),
                option,
            };
            RenderedOption {
                port,
                on_select: ctx.transition(port, &title),
                title,
                description,
            }
        })
        .collect();

    let default_port = SourcePort::StepDefault {
        step: ctx.step_index(),
    };
    Ok(StepContent::Choices {
        button_label,
        options,
        default_transition: ctx.transition(default_port, ctx.continue_label()),
    })
}

fn render_input(step: &Step, ctx: &RenderContext<'_>) -> Result<StepContent, CompileError> {
    match &step.payload {
        StepPayload::Input(input) => Ok(StepContent::Input {
            variable: step.output_variable().map(str::to_string),
            max_retries: input.validation.max_retries,
            min: input.validation.min,
            max: input.validation.max,
            regex: input.validation.regex.clone(),
            error_message: input.validation.error_message.clone(),
        }),
        _ => Err(ctx.mismatch(step)),
    }
}

fn render_condition(step: &Step, ctx: &RenderContext<'_>) -> Result<StepContent, CompileError> {
    match &step.payload {
        StepPayload::Condition(condition) => Ok(StepContent::Condition {
            subject: condition.subject.clone(),
            operator: condition.operator,
            value: condition.value.clone(),
        }),
        _ => Err(ctx.mismatch(step)),
    }
}

fn render_subflow_jump(step: &Step, ctx: &RenderContext<'_>) -> Result<StepContent, CompileError> {
    match &step.payload {
        StepPayload::SubflowJump(jump) => Ok(StepContent::SubflowJump {
            flow_id: jump.target_flow_id.clone(),
            node_id: jump.target_node_id.clone(),
        }),
        _ => Err(ctx.mismatch(step)),
    }
}

fn render_webhook(step: &Step, ctx: &RenderContext<'_>) -> Result<StepContent, CompileError> {
    match &step.payload {
        StepPayload::Webhook(hook) => Ok(StepContent::Webhook {
            url: hook.url.clone(),
            method: hook.method,
        }),
        _ => Err(ctx.mismatch(step)),
    }
}

/// Defines the built-in renderers and the function registering them, one
/// renderer per step kind.
macro_rules! define_step_renderers {
    ( $( ($struct_name:ident, $render:ident, [ $( $kind:path ),+ $(,)? ]) ),* $(,)? ) => {
        $(
            struct $struct_name(StepKind);
            impl StepRenderer for $struct_name {
                fn kind(&self) -> StepKind { self.0 }
                fn render(&self, step: &Step, ctx: &RenderContext<'_>) -> Result<StepContent, CompileError> {
                    $render(step, ctx)
                }
            }
        )*

        pub(super) fn register_default_renderers(registry: &mut AHashMap<StepKind, Box<dyn StepRenderer>>) {
            $( $( registry.insert($kind, Box::new($struct_name($kind))); )+ )*
        }
    };
}

define_step_renderers! {
    (MessageRenderer, render_message, [StepKind::Text]),
    (MediaRenderer, render_media, [StepKind::Image, StepKind::Video, StepKind::Audio, StepKind::File]),
    (LocationRenderer, render_location, [StepKind::Location]),
    (LinkRenderer, render_link, [StepKind::YouTubeLink, StepKind::Link]),
    (ChoiceRenderer, render_choices, [StepKind::QuickReply, StepKind::ListMenu]),
    (InputRenderer, render_input, [
        StepKind::TextInput,
        StepKind::NumberInput,
        StepKind::EmailInput,
        StepKind::PhoneInput,
        StepKind::DateInput,
        StepKind::TimeInput,
    ]),
    (ConditionRenderer, render_condition, [StepKind::Condition]),
    (SubflowJumpRenderer, render_subflow_jump, [StepKind::SubflowJump]),
    (WebhookRenderer, render_webhook, [StepKind::Webhook]),
}
