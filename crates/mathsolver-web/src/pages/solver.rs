//! Solver Page

use leptos::prelude::*;

use crate::api::{self, ChatMessage, ChatReply, Step};
use crate::components::{MessageBubble, StepList};

const MISSING_KEY_MESSAGE: &str = "Please add your Groq API key to continue";

const DEFAULT_QUESTION: &str = "I have 5 bananas and 7 grapes. I eat 2 bananas and give away 3 grapes. Then I buy a dozen apples and 2 packs of blueberries. Each pack of blueberries contains 25 berries. How many total pieces of fruit do I have at the end?";

/// A session is opened once, and only after a key has been entered
fn should_open_session(api_key: &str, opened: bool) -> bool {
    !opened && !api_key.trim().is_empty()
}

#[component]
pub fn SolverPage() -> impl IntoView {
    let (api_key, set_api_key) = signal(String::new());
    let (session_id, set_session_id) = signal(None::<String>);
    let (messages, set_messages) = signal(Vec::<ChatMessage>::new());
    let (question, set_question) = signal(DEFAULT_QUESTION.to_string());
    let (answer, set_answer) = signal(None::<String>);
    let (steps, set_steps) = signal(Vec::<Step>::new());
    let (intermediate, set_intermediate) = signal(String::new());
    let (warning, set_warning) = signal(None::<String>);
    let (error, set_error) = signal(None::<String>);
    let (loading, set_loading) = signal(false);
    let (opened, set_opened) = signal(false);

    // Nothing goes over the wire until a key is present
    Effect::new(move |_| {
        if !should_open_session(&api_key.get(), opened.get_untracked()) {
            return;
        }
        set_opened.set(true);
        leptos::task::spawn_local(async move {
            match api::create_session().await {
                Ok(session) => {
                    set_session_id.set(Some(session.session_id));
                    set_messages.set(session.messages);
                }
                Err(e) => set_error.set(Some(e)),
            }
        });
    });

    let submit = move |_| {
        if loading.get() {
            return;
        }

        set_warning.set(None);
        set_error.set(None);
        set_loading.set(true);

        let key = api_key.get();
        let id = session_id.get();
        let text = question.get();
        leptos::task::spawn_local(async move {
            match api::send_chat(id.as_deref(), &text, &key).await {
                Ok(ChatReply::Warning { session_id, warning, messages }) => {
                    set_session_id.set(Some(session_id));
                    set_messages.set(messages);
                    set_warning.set(Some(warning));
                }
                Ok(ChatReply::Answered {
                    session_id,
                    answer,
                    steps,
                    intermediate_steps,
                    messages,
                }) => {
                    set_session_id.set(Some(session_id));
                    set_messages.set(messages);
                    set_answer.set(Some(answer));
                    set_steps.set(steps);
                    set_intermediate.set(intermediate_steps);
                }
                Err(e) => set_error.set(Some(e)),
            }
            set_loading.set(false);
        });
    };

    let has_key = move || !api_key.get().trim().is_empty();

    view! {
        <div class="solver">
            <aside class="sidebar">
                <h2>"Settings"</h2>
                <div class="field">
                    <label>"Groq API Key"</label>
                    <input
                        type="password"
                        prop:value=move || api_key.get()
                        on:input=move |ev| set_api_key.set(event_target_value(&ev))
                    />
                </div>
            </aside>

            <section class="solver-main">
                <h1>"Text To Math Problem Solver Using Google Gemma 2"</h1>

                <Show
                    when=has_key
                    fallback=|| view! { <div class="info">{MISSING_KEY_MESSAGE}</div> }
                >
                    <div class="messages">
                        <For
                            each=move || messages.get().into_iter().enumerate()
                            key=|(i, msg)| (*i, msg.content.len())
                            children=move |(_, msg)| view! { <MessageBubble message=msg /> }
                        />
                    </div>

                    <div class="input-area">
                        <label>"Enter your question:"</label>
                        <textarea
                            prop:value=move || question.get()
                            on:input=move |ev| set_question.set(event_target_value(&ev))
                        />
                        <button on:click=submit disabled=move || loading.get()>
                            {move || if loading.get() { "Generating response..." } else { "Find my answer" }}
                        </button>
                    </div>

                    {move || warning.get().map(|w| view! { <div class="warning">{w}</div> })}
                    {move || error.get().map(|e| view! { <div class="error">{e}</div> })}

                    {move || {
                        answer
                            .get()
                            .map(|a| {
                                view! {
                                    <div class="response">
                                        <h3>"Response"</h3>
                                        <div class="answer">{a}</div>
                                        <StepList steps=steps.get() />
                                        <div class="intermediate">{intermediate.get()}</div>
                                    </div>
                                }
                            })
                    }}
                </Show>
            </section>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_session_without_key() {
        assert!(!should_open_session("", false));
        assert!(!should_open_session("   ", false));
    }

    #[test]
    fn test_session_opened_once() {
        assert!(should_open_session("gsk_abc", false));
        assert!(!should_open_session("gsk_abcd", true));
    }
}
