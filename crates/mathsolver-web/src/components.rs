//! UI Components

use leptos::prelude::*;

use crate::api::{ChatMessage, Step};

/// Message bubble component
#[component]
pub fn MessageBubble(message: ChatMessage) -> impl IntoView {
    let class = format!("message message-{}", message.role);

    view! {
        <div class=class>
            <span class="role">{message.role.clone()}</span>
            <p class="content">{message.content.clone()}</p>
        </div>
    }
}

/// Collapsed list of the tool calls behind an answer
#[component]
pub fn StepList(steps: Vec<Step>) -> impl IntoView {
    view! {
        <details class="steps">
            <summary>{format!("Thoughts ({} steps)", steps.len())}</summary>
            <ol>
                {steps
                    .into_iter()
                    .map(|step| {
                        view! {
                            <li>
                                <strong>{step.tool}</strong>
                                <code>{step.tool_input}</code>
                                <pre>{step.observation}</pre>
                            </li>
                        }
                    })
                    .collect_view()}
            </ol>
        </details>
    }
}
