use crate::bot::client::BackendApi;
use crate::bot::context::{ConversationContext, ConversationStore, DialogueState, Sender};
use crate::bot::menu::{self, Button, Reply};
use crate::entities::MaterialType;
use crate::error::AppError;
use crate::models::*;
use crate::utils::{is_valid_card_number, parse_amount, truncate_chars};
use chrono::Utc;

const MAX_SENDER_LABEL_LEN: usize = 250;
const MAX_TRANSACTION_ID_LEN: usize = 100;
const MAX_CARD_NAME_LEN: usize = 100;

/// One inbound Telegram update, reduced to what the flows care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Command(String),
    Callback(String),
    Text(String),
}

/// Reference sent to the backend for card payments; the card number itself
/// never leaves the bot.
fn payment_reference(telegram_id: &str, card_number: &str) -> String {
    let last4 = &card_number[card_number.len().saturating_sub(4)..];
    format!(
        "tg{telegram_id}-{}-{last4}",
        Utc::now().timestamp_millis()
    )
}

fn parse_id(data: &str, prefix: &str) -> Option<i32> {
    data.strip_prefix(prefix)?.parse().ok().filter(|id| *id > 0)
}

pub struct Dialogue<B: BackendApi> {
    backend: B,
    store: ConversationStore,
}

impl<B: BackendApi> Dialogue<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            store: ConversationStore::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Current state of a chat's conversation, if one is in progress.
    pub async fn state(&self, chat_id: i64) -> Option<DialogueState> {
        self.store.state(chat_id).await
    }

    /// Runs one update to completion. Updates for the same chat are handled
    /// in arrival order, one at a time.
    pub async fn handle(&self, chat_id: i64, sender: &Sender, input: Input) -> Reply {
        let guard = self.store.lock_chat(chat_id).await;
        let mut ctx = self
            .store
            .take(chat_id)
            .await
            .unwrap_or_else(|| ConversationContext::new(sender));

        let reply = match input {
            Input::Command(command) => self.on_command(&mut ctx, &command),
            Input::Callback(data) => self.on_callback(&mut ctx, sender, &data).await,
            Input::Text(text) => self.on_text(&mut ctx, sender, text.trim()).await,
        };

        if ctx.state != DialogueState::Ended {
            self.store.put(chat_id, ctx).await;
        }
        self.store.unlock_chat(chat_id, guard).await;
        reply
    }

    fn on_command(&self, ctx: &mut ConversationContext, command: &str) -> Reply {
        let name = command.trim().trim_start_matches('/');
        let name = name.split('@').next().unwrap_or_default();
        match name {
            "start" => {
                ctx.reset_selections();
                ctx.state = DialogueState::Start;
                menu::welcome()
            }
            "menu" | "cancel" => self.main_menu(ctx, "Main menu"),
            _ => self.reprompt(ctx),
        }
    }

    async fn on_callback(
        &self,
        ctx: &mut ConversationContext,
        sender: &Sender,
        data: &str,
    ) -> Reply {
        use DialogueState::*;

        match (data, ctx.state) {
            ("register", _) => self.register(ctx, sender).await,
            ("accept_user_agreement", AwaitingConsent) => self.record_consent(ctx, true).await,
            ("reject_user_agreement", AwaitingConsent) => self.record_consent(ctx, false).await,
            ("go_back_to_menu", _) => self.main_menu(ctx, "Main menu"),
            ("select_plan", _) => self.show_plans(ctx).await,
            ("gift_subscription", _) => self.start_gift(ctx),
            ("recharge_balance", _) => self.show_top_up_methods(ctx).await,
            ("support", _) => self.start_support(ctx).await,
            ("materials", _) => {
                ctx.reset_selections();
                ctx.state = Materials;
                menu::materials_menu()
            }
            ("fill_card", _) => {
                ctx.reset_selections();
                ctx.state = CardName;
                Reply::text("Let's fill in your client card. What is your name?")
                    .with_keyboard(vec![menu::back_to_menu_row()])
            }
            ("feedback", _) => {
                ctx.reset_selections();
                ctx.state = Feedback;
                Reply::text("Please write your feedback:")
                    .with_keyboard(vec![menu::back_to_menu_row()])
            }
            ("chatbots", _) => {
                ctx.reset_selections();
                ctx.state = Chatbots;
                menu::chatbots_menu()
            }
            ("my_account", _) => self.show_account(ctx).await,
            ("go_back_to_plans", SelectMethod | EnterCardNumber) => self.show_plans(ctx).await,
            ("go_back_to_methods", EnterCardNumber) => self.show_methods(ctx).await,
            ("go_back_to_gift_plans", GiftMethod | GiftCardNumber) => {
                self.show_gift_plans(ctx).await
            }
            ("go_back_to_gift_methods", GiftCardNumber) => self.show_gift_methods(ctx).await,
            ("show_faq", SupportFaq | SupportChat) => {
                ctx.state = SupportFaq;
                menu::faq_list()
            }
            ("send_support_message", SupportFaq | SupportChat) => {
                ctx.state = SupportChat;
                Reply::text("Type your message for the support team:")
                    .with_keyboard(vec![menu::back_to_menu_row()])
            }
            _ => self.on_state_callback(ctx, data).await,
        }
    }

    /// Callbacks that carry a selection for the current step.
    async fn on_state_callback(&self, ctx: &mut ConversationContext, data: &str) -> Reply {
        match ctx.state {
            DialogueState::SelectPlan => {
                if let Some(id) = parse_id(data, "select_plan_") {
                    ctx.plan_id = Some(id);
                    return self.show_methods(ctx).await;
                }
            }
            DialogueState::SelectMethod => {
                if let Some(id) = parse_id(data, "select_method_") {
                    ctx.method_id = Some(id);
                    ctx.state = DialogueState::EnterCardNumber;
                    return Reply::text("Enter your card number (13 to 19 digits):").with_keyboard(
                        vec![vec![Button::new("Back", "go_back_to_methods")]],
                    );
                }
            }
            DialogueState::GiftPlan => {
                if let Some(id) = parse_id(data, "select_gift_plan_") {
                    ctx.plan_id = Some(id);
                    return self.show_gift_methods(ctx).await;
                }
            }
            DialogueState::GiftMethod => {
                if let Some(id) = parse_id(data, "select_gift_method_") {
                    ctx.method_id = Some(id);
                    ctx.state = DialogueState::GiftCardNumber;
                    return Reply::text("Enter your card number (13 to 19 digits):").with_keyboard(
                        vec![vec![Button::new("Back", "go_back_to_gift_methods")]],
                    );
                }
            }
            DialogueState::TopUpMethod => {
                if let Some(id) = parse_id(data, "payment_method_") {
                    ctx.method_id = Some(id);
                    ctx.state = DialogueState::TopUpAmount;
                    return Reply::text("Enter the amount to top up:")
                        .with_keyboard(vec![menu::back_to_menu_row()]);
                }
            }
            DialogueState::SupportFaq => {
                let item = data
                    .strip_prefix("faq_")
                    .and_then(|i| i.parse::<usize>().ok())
                    .and_then(|i| i.checked_sub(1))
                    .and_then(|i| menu::FAQ_ITEMS.get(i));
                if let Some(item) = item {
                    return menu::faq_answer(item);
                }
            }
            DialogueState::Materials => {
                let kind = match data {
                    "material_methodichka" => Some(MaterialType::Methodichka),
                    "material_workbook" => Some(MaterialType::Workbook),
                    _ => None,
                };
                if let Some(kind) = kind {
                    return self.send_material(ctx, kind).await;
                }
            }
            DialogueState::Chatbots => {
                let bot = data
                    .strip_prefix("chatbot_")
                    .and_then(|slug| menu::CHATBOTS.iter().find(|c| c.slug == slug));
                if let Some(bot) = bot {
                    ctx.state = DialogueState::Ended;
                    return Reply::text(format!("{}: {}", bot.label, bot.link))
                        .with_keyboard(vec![menu::back_to_menu_row()]);
                }
            }
            _ => {}
        }
        self.reprompt(ctx)
    }

    async fn on_text(&self, ctx: &mut ConversationContext, sender: &Sender, text: &str) -> Reply {
        match ctx.state {
            DialogueState::EnterCardNumber => self.pay_for_plan(ctx, text).await,
            DialogueState::GiftRecipient => {
                if !text.starts_with('@') || text.chars().count() < 2 {
                    return Reply::text("Please enter the recipient's username starting with @.")
                        .with_keyboard(vec![menu::back_to_menu_row()]);
                }
                ctx.recipient = Some(text.to_string());
                self.show_gift_plans(ctx).await
            }
            DialogueState::GiftCardNumber => self.send_gift(ctx, text).await,
            DialogueState::TopUpAmount => match parse_amount(text) {
                Ok(amount) => {
                    ctx.amount = Some(amount);
                    ctx.state = DialogueState::TopUpTransactionId;
                    Reply::text("Enter the transaction id of your transfer:")
                        .with_keyboard(vec![menu::back_to_menu_row()])
                }
                Err(_) => Reply::text("Please enter a positive amount, for example 50.00.")
                    .with_keyboard(vec![menu::back_to_menu_row()]),
            },
            DialogueState::TopUpTransactionId => self.top_up(ctx, text).await,
            DialogueState::SupportChat => self.send_support_message(ctx, sender, text).await,
            DialogueState::CardName => {
                let len = text.chars().count();
                if len == 0 || len > MAX_CARD_NAME_LEN {
                    return Reply::text("Please enter a name of up to 100 characters.");
                }
                ctx.card.name = Some(text.to_string());
                ctx.state = DialogueState::CardAge;
                Reply::text("How old are you?")
            }
            DialogueState::CardAge => match text.parse::<i32>() {
                Ok(age) if (0..=150).contains(&age) => {
                    ctx.card.age = Some(age);
                    ctx.state = DialogueState::CardGoals;
                    Reply::text("What goals would you like to achieve?")
                }
                _ => Reply::text("Please enter your age as a number."),
            },
            DialogueState::CardGoals => {
                if text.is_empty() {
                    return Reply::text("Please describe your goals.");
                }
                ctx.card.goals = Some(text.to_string());
                ctx.state = DialogueState::CardChallenges;
                Reply::text("What challenges are you facing?")
            }
            DialogueState::CardChallenges => self.save_client_card(ctx, text).await,
            DialogueState::Feedback => {
                if text.is_empty() {
                    return Reply::text("Feedback cannot be empty.");
                }
                let request = FeedbackRequest {
                    content: Some(text.to_string()),
                };
                match self.backend.submit_feedback(&request).await {
                    Ok(_) => self.main_menu(ctx, "Thank you for your feedback!"),
                    Err(e) => self.failure(ctx, "submit feedback", e),
                }
            }
            _ => self.reprompt(ctx),
        }
    }

    fn main_menu(&self, ctx: &mut ConversationContext, text: &str) -> Reply {
        ctx.reset_selections();
        ctx.state = DialogueState::Ended;
        menu::main_menu(text)
    }

    fn failure(&self, ctx: &mut ConversationContext, action: &str, err: AppError) -> Reply {
        log::error!(
            "Backend call failed for {} ({action}): {err}",
            ctx.telegram_id
        );
        self.main_menu(ctx, menu::GENERIC_ERROR)
    }

    fn reprompt(&self, ctx: &ConversationContext) -> Reply {
        let text = match ctx.state {
            DialogueState::Start | DialogueState::Ended => return menu::welcome(),
            DialogueState::AwaitingConsent => return menu::agreement(),
            DialogueState::EnterCardNumber | DialogueState::GiftCardNumber => {
                "Invalid card number. Please enter 13 to 19 digits."
            }
            DialogueState::GiftRecipient => {
                "Please enter the recipient's username starting with @."
            }
            DialogueState::TopUpAmount => "Please enter a positive amount, for example 50.00.",
            DialogueState::TopUpTransactionId => "Please enter the transaction id.",
            DialogueState::SupportChat => "Type your message for the support team.",
            DialogueState::CardName => "What is your name?",
            DialogueState::CardAge => "Please enter your age as a number.",
            DialogueState::CardGoals => "What goals would you like to achieve?",
            DialogueState::CardChallenges => "What challenges are you facing?",
            DialogueState::Feedback => "Please write your feedback.",
            _ => "Please choose one of the options above.",
        };
        Reply::text(text).with_keyboard(vec![menu::back_to_menu_row()])
    }

    async fn register(&self, ctx: &mut ConversationContext, sender: &Sender) -> Reply {
        ctx.reset_selections();
        ctx.username = sender.username.clone();
        match self
            .backend
            .register(&ctx.telegram_id, ctx.username.as_deref())
            .await
        {
            Ok(resp) if resp.consent_given => {
                self.main_menu(ctx, "Welcome back! Choose an option:")
            }
            Ok(_) => {
                ctx.state = DialogueState::AwaitingConsent;
                menu::agreement()
            }
            Err(e) => self.failure(ctx, "register", e),
        }
    }

    async fn record_consent(&self, ctx: &mut ConversationContext, given: bool) -> Reply {
        match self.backend.set_consent(&ctx.telegram_id, given).await {
            Ok(_) if given => self.main_menu(ctx, "Thank you! Choose an option:"),
            Ok(_) => {
                ctx.state = DialogueState::Ended;
                Reply::text(
                    "We cannot continue without your consent. You can start again at any time.",
                )
                .with_keyboard(vec![vec![Button::new("Start over", "register")]])
            }
            Err(e) => self.failure(ctx, "set consent", e),
        }
    }

    async fn show_plans(&self, ctx: &mut ConversationContext) -> Reply {
        ctx.reset_selections();
        match self.backend.subscription_plans().await {
            Ok(plans) if plans.is_empty() => {
                self.main_menu(ctx, "No subscription plans are available right now.")
            }
            Ok(plans) => {
                ctx.state = DialogueState::SelectPlan;
                Reply::text("Choose a subscription plan:").with_keyboard(menu::plans_keyboard(
                    &plans,
                    "select_plan_",
                    "go_back_to_menu",
                ))
            }
            Err(e) => self.failure(ctx, "list plans", e),
        }
    }

    async fn show_methods(&self, ctx: &mut ConversationContext) -> Reply {
        ctx.method_id = None;
        match self.backend.payment_methods().await {
            Ok(methods) if methods.is_empty() => {
                self.main_menu(ctx, "No payment methods are available right now.")
            }
            Ok(methods) => {
                ctx.state = DialogueState::SelectMethod;
                Reply::text("Choose a payment method:").with_keyboard(menu::methods_keyboard(
                    &methods,
                    "select_method_",
                    "go_back_to_plans",
                ))
            }
            Err(e) => self.failure(ctx, "list payment methods", e),
        }
    }

    async fn pay_for_plan(&self, ctx: &mut ConversationContext, card_number: &str) -> Reply {
        if !is_valid_card_number(card_number) {
            return self.reprompt(ctx);
        }
        let (Some(plan_id), Some(method_id)) = (ctx.plan_id, ctx.method_id) else {
            return self.show_plans(ctx).await;
        };
        let request = MakePaymentRequest {
            payment_method: Some(method_id.into()),
            transaction_id: Some(payment_reference(&ctx.telegram_id, card_number)),
            amount: None,
            subscription_plan: Some(plan_id.into()),
        };
        match self.backend.make_payment(&ctx.telegram_id, &request).await {
            Ok(payment) => self.main_menu(
                ctx,
                &format!(
                    "Payment of {} received. Thank you for your purchase!",
                    payment.amount
                ),
            ),
            Err(e) => self.failure(ctx, "pay for plan", e),
        }
    }

    fn start_gift(&self, ctx: &mut ConversationContext) -> Reply {
        ctx.reset_selections();
        ctx.state = DialogueState::GiftRecipient;
        Reply::text(
            "Enter the username of the person you want to gift a subscription to \
             (for example @username):",
        )
        .with_keyboard(vec![menu::back_to_menu_row()])
    }

    async fn show_gift_plans(&self, ctx: &mut ConversationContext) -> Reply {
        ctx.plan_id = None;
        ctx.method_id = None;
        match self.backend.subscription_plans().await {
            Ok(plans) if plans.is_empty() => {
                self.main_menu(ctx, "No subscription plans are available right now.")
            }
            Ok(plans) => {
                ctx.state = DialogueState::GiftPlan;
                Reply::text("Choose a plan to gift:").with_keyboard(menu::plans_keyboard(
                    &plans,
                    "select_gift_plan_",
                    "go_back_to_menu",
                ))
            }
            Err(e) => self.failure(ctx, "list plans for gift", e),
        }
    }

    async fn show_gift_methods(&self, ctx: &mut ConversationContext) -> Reply {
        ctx.method_id = None;
        match self.backend.payment_methods().await {
            Ok(methods) if methods.is_empty() => {
                self.main_menu(ctx, "No payment methods are available right now.")
            }
            Ok(methods) => {
                ctx.state = DialogueState::GiftMethod;
                Reply::text("Choose a payment method:").with_keyboard(menu::methods_keyboard(
                    &methods,
                    "select_gift_method_",
                    "go_back_to_gift_plans",
                ))
            }
            Err(e) => self.failure(ctx, "list payment methods for gift", e),
        }
    }

    async fn send_gift(&self, ctx: &mut ConversationContext, card_number: &str) -> Reply {
        if !is_valid_card_number(card_number) {
            return self.reprompt(ctx);
        }
        let (Some(recipient), Some(plan_id), Some(method_id)) =
            (ctx.recipient.clone(), ctx.plan_id, ctx.method_id)
        else {
            return self.start_gift(ctx);
        };
        let request = GiftSubscriptionRequest {
            recipient_username: Some(recipient.clone()),
            plan_id: Some(plan_id.into()),
            transaction_id: Some(serde_json::Value::String(payment_reference(
                &ctx.telegram_id,
                card_number,
            ))),
            payment_method: Some(method_id.into()),
        };
        match self.backend.gift_subscription(&ctx.telegram_id, &request).await {
            Ok(_) => self.main_menu(
                ctx,
                &format!("The subscription was gifted to {recipient}. Thank you!"),
            ),
            Err(e) => self.failure(ctx, "gift subscription", e),
        }
    }

    async fn show_top_up_methods(&self, ctx: &mut ConversationContext) -> Reply {
        ctx.reset_selections();
        match self.backend.payment_methods().await {
            Ok(methods) if methods.is_empty() => {
                self.main_menu(ctx, "No payment methods are available right now.")
            }
            Ok(methods) => {
                ctx.state = DialogueState::TopUpMethod;
                Reply::text("Choose a payment method for the top-up:").with_keyboard(
                    menu::methods_keyboard(&methods, "payment_method_", "go_back_to_menu"),
                )
            }
            Err(e) => self.failure(ctx, "list payment methods for top-up", e),
        }
    }

    async fn top_up(&self, ctx: &mut ConversationContext, transaction_id: &str) -> Reply {
        if transaction_id.is_empty() || transaction_id.chars().count() > MAX_TRANSACTION_ID_LEN {
            return Reply::text("Please enter a transaction id of up to 100 characters.")
                .with_keyboard(vec![menu::back_to_menu_row()]);
        }
        let (Some(method_id), Some(amount)) = (ctx.method_id, ctx.amount) else {
            return self.show_top_up_methods(ctx).await;
        };
        let request = MakePaymentRequest {
            payment_method: Some(method_id.into()),
            transaction_id: Some(transaction_id.to_string()),
            amount: Some(amount.to_string().into()),
            subscription_plan: None,
        };
        match self.backend.make_payment(&ctx.telegram_id, &request).await {
            Ok(_) => self.main_menu(ctx, &format!("Your balance was topped up by {amount}.")),
            Err(e) => self.failure(ctx, "top up", e),
        }
    }

    async fn start_support(&self, ctx: &mut ConversationContext) -> Reply {
        ctx.reset_selections();
        match self.backend.start_support_session(&ctx.telegram_id).await {
            Ok(session) => {
                ctx.support_session_id = Some(session.session_id);
                ctx.state = DialogueState::SupportFaq;
                menu::faq_list()
            }
            Err(e) => self.failure(ctx, "start support session", e),
        }
    }

    async fn send_support_message(
        &self,
        ctx: &mut ConversationContext,
        sender: &Sender,
        text: &str,
    ) -> Reply {
        if text.is_empty() {
            return self.reprompt(ctx);
        }
        let Some(session_id) = ctx.support_session_id else {
            return self.start_support(ctx).await;
        };
        let request = SendMessageRequest {
            session_id: Some(session_id.into()),
            sender: Some(truncate_chars(sender.display_name(), MAX_SENDER_LABEL_LEN)),
            message_text: Some(text.to_string()),
        };
        match self.backend.send_support_message(&request).await {
            Ok(_) => Reply::text(
                "Your message was sent. Feel free to write more if you have other questions.",
            )
            .with_keyboard(vec![menu::back_to_menu_row()]),
            Err(e) => self.failure(ctx, "send support message", e),
        }
    }

    async fn send_material(&self, ctx: &mut ConversationContext, kind: MaterialType) -> Reply {
        match self.backend.material(kind).await {
            Ok(material) => {
                ctx.state = DialogueState::Ended;
                Reply::text(material.title)
                    .with_document(material.document_url)
                    .with_keyboard(vec![menu::back_to_menu_row()])
            }
            Err(e) => self.failure(ctx, "fetch material", e),
        }
    }

    async fn save_client_card(&self, ctx: &mut ConversationContext, challenges: &str) -> Reply {
        if challenges.is_empty() {
            return self.reprompt(ctx);
        }
        let request = ClientCardRequest {
            name: ctx.card.name.clone(),
            age: ctx.card.age.map(Into::into),
            goals: ctx.card.goals.clone(),
            challenges: Some(challenges.to_string()),
        };
        match self
            .backend
            .create_client_card(&ctx.telegram_id, &request)
            .await
        {
            Ok(_) => self.main_menu(ctx, "Your client card was saved. Thank you!"),
            Err(e) => self.failure(ctx, "save client card", e),
        }
    }

    async fn show_account(&self, ctx: &mut ConversationContext) -> Reply {
        match self.backend.profile(&ctx.telegram_id).await {
            Ok(profile) => self.main_menu(ctx, &menu::account_summary(&profile)),
            Err(e) => self.failure(ctx, "load profile", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("select_plan_12", "select_plan_"), Some(12));
        assert_eq!(parse_id("select_plan_0", "select_plan_"), None);
        assert_eq!(parse_id("select_plan_x", "select_plan_"), None);
        assert_eq!(parse_id("select_method_1", "select_plan_"), None);
    }

    #[test]
    fn test_payment_reference_hides_card_number() {
        let reference = payment_reference("42", "4111111111111111");
        assert!(reference.starts_with("tg42-"));
        assert!(reference.ends_with("-1111"));
        assert!(!reference.contains("411111111111"));
        assert!(reference.len() <= MAX_TRANSACTION_ID_LEN);
    }
}
