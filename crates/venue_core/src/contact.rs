//! Simulated contact form submission.
//!
//! # Invariants
//! - Phases advance `Idle -> Sending -> Sent -> Idle`, one timer per step.
//! - Submissions outside `Idle` are ignored.
//! - The original button label is restored at the end of the cycle.

use crate::dom::Dom;
use log::info;
use std::time::Duration;

pub const CONTACT_FORM_ID: &str = "contactForm";
const SENDING_LABEL: &str = "Sending...";
const SENT_LABEL: &str = "Message Sent!";
const SENT_BACKGROUND: &str = "var(--text-main)";
const SENT_COLOR: &str = "var(--bg-dark)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPhase {
    Idle,
    Sending,
    Sent,
}

#[derive(Debug, Clone)]
pub struct ContactForm<N> {
    form: N,
    button: Option<N>,
    original_label: String,
    phase: ContactPhase,
    send_delay: Duration,
    reset_delay: Duration,
}

impl<N: Clone> ContactForm<N> {
    pub fn new<D: Dom<Node = N>>(
        dom: &D,
        form: N,
        send_delay: Duration,
        reset_delay: Duration,
    ) -> Self {
        let button = dom.query_within(&form, "button");
        Self {
            form,
            button,
            original_label: String::new(),
            phase: ContactPhase::Idle,
            send_delay,
            reset_delay,
        }
    }

    pub fn form(&self) -> &N {
        &self.form
    }

    pub fn phase(&self) -> ContactPhase {
        self.phase
    }

    /// Starts a simulated send; returns the delay until `advance`.
    pub fn submit<D: Dom<Node = N>>(&mut self, dom: &D) -> Option<Duration> {
        if self.phase != ContactPhase::Idle {
            return None;
        }
        let button = self.button.as_ref()?;
        self.original_label = dom.text(button);
        dom.set_text(button, SENDING_LABEL);
        dom.set_attribute(button, "disabled", "");
        self.phase = ContactPhase::Sending;
        info!("event=contact_submit module=contact status=start");
        Some(self.send_delay)
    }

    /// Runs the next timed step; returns the delay until the following one.
    pub fn advance<D: Dom<Node = N>>(&mut self, dom: &D) -> Option<Duration> {
        let button = self.button.as_ref()?;
        match self.phase {
            ContactPhase::Idle => None,
            ContactPhase::Sending => {
                dom.set_text(button, SENT_LABEL);
                dom.set_style(button, "background", SENT_BACKGROUND);
                dom.set_style(button, "color", SENT_COLOR);
                dom.reset_form(&self.form);
                self.phase = ContactPhase::Sent;
                info!("event=contact_submit module=contact status=ok");
                Some(self.reset_delay)
            }
            ContactPhase::Sent => {
                dom.set_text(button, &self.original_label);
                dom.remove_attribute(button, "disabled");
                dom.remove_style(button, "background");
                dom.remove_style(button, "color");
                self.phase = ContactPhase::Idle;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ContactForm, ContactPhase};
    use crate::dom::{Dom, MemoryDom};
    use std::time::Duration;

    #[test]
    fn full_cycle_restores_button() {
        let dom = MemoryDom::new();
        let form = dom.add_element(dom.body(), "form", Some("contactForm"), "");
        let input = dom.add_element(form, "input", None, "");
        dom.set_attribute(&input, "value", "hello");
        let button = dom.add_element(form, "button", None, "");
        dom.set_text(&button, "Send Message");

        let mut contact = ContactForm::new(
            &dom,
            form,
            Duration::from_millis(1_500),
            Duration::from_millis(3_000),
        );
        assert_eq!(contact.submit(&dom), Some(Duration::from_millis(1_500)));
        assert_eq!(dom.text(&button), "Sending...");
        assert!(dom.attribute(&button, "disabled").is_some());
        assert_eq!(contact.submit(&dom), None);

        assert_eq!(contact.advance(&dom), Some(Duration::from_millis(3_000)));
        assert_eq!(dom.text(&button), "Message Sent!");
        assert_eq!(dom.attribute(&input, "value"), None);
        assert_eq!(contact.phase(), ContactPhase::Sent);

        assert_eq!(contact.advance(&dom), None);
        assert_eq!(dom.text(&button), "Send Message");
        assert!(dom.attribute(&button, "disabled").is_none());
        assert_eq!(dom.style(&button, "background"), None);
    }

    #[test]
    fn form_without_button_ignores_submit() {
        let dom = MemoryDom::new();
        let form = dom.add_element(dom.body(), "form", Some("contactForm"), "");
        let mut contact =
            ContactForm::new(&dom, form, Duration::from_millis(1), Duration::from_millis(1));
        assert_eq!(contact.submit(&dom), None);
        assert_eq!(contact.phase(), ContactPhase::Idle);
    }
}
