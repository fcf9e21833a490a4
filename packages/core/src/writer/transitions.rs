//! State transition validation
//!
//! The transition table: given the current scope and the state a write
//! call wants to enter, decide whether the move is legal. Contextual
//! predicates (writer intent, protocol version, payload direction, stack
//! depth) refine the static table.

use crate::error::{constructors, WriteResult};
use crate::payload::PayloadItem;

use super::scope::Scope;
use super::settings::ODataVersion;
use super::state::WriterState;

/// What the writer was created to produce at the top level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterIntent {
    Resource,
    ResourceSet,
    DeltaResourceSet,
}

/// Everything transition validation looks at besides the target state
#[derive(Debug, Clone, Copy)]
pub struct TransitionContext<'a> {
    pub from: &'a Scope,
    pub intent: WriterIntent,
    pub version: ODataVersion,
    pub is_request: bool,
    /// Scope stack depth including the root
    pub stack_depth: usize,
}

/// Validate a transition, returning the taxonomy error on refusal.
pub fn validate_transition(ctx: &TransitionContext<'_>, to: WriterState) -> WriteResult<()> {
    if to == WriterState::Error {
        return Ok(());
    }
    let from = ctx.from;
    match from.state {
        WriterState::Start => validate_from_start(ctx, to),
        WriterState::Resource => validate_from_resource(from, to),
        WriterState::DeletedResource => validate_from_deleted_resource(ctx, to),
        WriterState::ResourceSet => validate_from_resource_set(from, to),
        WriterState::DeltaResourceSet => validate_from_delta_resource_set(ctx, to),
        WriterState::NestedResourceInfo => {
            // Only the internal promotion enters the with-content form.
            if to == WriterState::NestedResourceInfoWithContent {
                Ok(())
            } else {
                Err(constructors::invalid_state_transition(from.state, to))
            }
        }
        WriterState::NestedResourceInfoWithContent => validate_from_expanded_link(ctx, to),
        WriterState::Property => validate_from_property(from, to),
        WriterState::Primitive
        | WriterState::DeltaLink
        | WriterState::DeltaDeletedLink => {
            // Balanced internally; a caller never writes from these states.
            Err(constructors::invalid_state_transition(from.state, to))
        }
        WriterState::Stream | WriterState::TextValue => Err(constructors::stream_not_disposed()),
        WriterState::Completed => Err(constructors::invalid_transition_from_completed(to)),
        WriterState::Error => Err(constructors::invalid_transition_from_error()),
    }
}

fn validate_from_start(ctx: &TransitionContext<'_>, to: WriterState) -> WriteResult<()> {
    let allowed = match to {
        WriterState::ResourceSet => ctx.intent == WriterIntent::ResourceSet,
        WriterState::DeltaResourceSet => ctx.intent == WriterIntent::DeltaResourceSet,
        WriterState::Resource | WriterState::DeletedResource => {
            ctx.intent == WriterIntent::Resource
        }
        _ => false,
    };
    if allowed {
        Ok(())
    } else {
        Err(constructors::invalid_transition_from_start(to))
    }
}

fn validate_from_resource(from: &Scope, to: WriterState) -> WriteResult<()> {
    if is_null_resource(from) {
        return Err(constructors::invalid_transition_from_null_resource(to));
    }
    match to {
        WriterState::NestedResourceInfo | WriterState::Property => Ok(()),
        _ => Err(constructors::invalid_state_transition(from.state, to)),
    }
}

fn validate_from_deleted_resource(
    ctx: &TransitionContext<'_>,
    to: WriterState,
) -> WriteResult<()> {
    match to {
        WriterState::Property => Ok(()),
        WriterState::NestedResourceInfo => {
            if ctx.version >= ODataVersion::V401 {
                Ok(())
            } else {
                Err(constructors::invalid_transition_from_v4_deleted_resource())
            }
        }
        _ => Err(constructors::invalid_state_transition(ctx.from.state, to)),
    }
}

fn validate_from_resource_set(from: &Scope, to: WriterState) -> WriteResult<()> {
    if from.is_untyped() {
        return match to {
            WriterState::Resource
            | WriterState::Primitive
            | WriterState::Stream
            | WriterState::TextValue
            | WriterState::ResourceSet => Ok(()),
            _ => Err(constructors::invalid_transition_from_resource_set(to)),
        };
    }
    if to == WriterState::Resource {
        Ok(())
    } else {
        Err(constructors::invalid_transition_from_resource_set(to))
    }
}

fn validate_from_delta_resource_set(
    ctx: &TransitionContext<'_>,
    to: WriterState,
) -> WriteResult<()> {
    match to {
        WriterState::Resource | WriterState::DeletedResource => Ok(()),
        WriterState::DeltaLink | WriterState::DeltaDeletedLink => {
            // Link deltas only appear directly under a top-level delta set.
            if ctx.stack_depth < 3 {
                Ok(())
            } else {
                Err(constructors::invalid_state_transition(ctx.from.state, to))
            }
        }
        _ => Err(constructors::invalid_state_transition(ctx.from.state, to)),
    }
}

fn validate_from_expanded_link(ctx: &TransitionContext<'_>, to: WriterState) -> WriteResult<()> {
    match to {
        WriterState::ResourceSet | WriterState::Resource | WriterState::Primitive => Ok(()),
        WriterState::DeltaResourceSet | WriterState::DeletedResource => {
            if ctx.version >= ODataVersion::V401 {
                Ok(())
            } else {
                Err(constructors::invalid_transition_from_expanded_link(to))
            }
        }
        _ => Err(constructors::invalid_transition_from_expanded_link(to)),
    }
}

fn validate_from_property(from: &Scope, to: WriterState) -> WriteResult<()> {
    let value_written = from.property_data().is_some_and(|d| d.value_written);
    match to {
        WriterState::Stream | WriterState::TextValue | WriterState::Primitive => {
            if value_written {
                Err(constructors::property_value_already_written(
                    property_name(from),
                ))
            } else {
                Ok(())
            }
        }
        _ => Err(constructors::invalid_state_transition(from.state, to)),
    }
}

fn is_null_resource(scope: &Scope) -> bool {
    matches!(&scope.item, Some(PayloadItem::Resource(r)) if r.is_null)
}

fn property_name(scope: &Scope) -> &str {
    match &scope.item {
        Some(PayloadItem::Property(info)) => &info.name,
        _ => "",
    }
}
