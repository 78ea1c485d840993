use crate::models::{PaymentMethodResponse, ProfileResponse, SubscriptionPlanResponse};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub data: String,
}

impl Button {
    pub fn new(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            data: data.into(),
        }
    }
}

pub type Keyboard = Vec<Vec<Button>>;

/// What the bot sends back for one update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Keyboard,
    pub document_url: Option<String>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = keyboard;
        self
    }

    pub fn with_document(mut self, url: impl Into<String>) -> Self {
        self.document_url = Some(url.into());
        self
    }

    pub fn has_button(&self, data: &str) -> bool {
        self.keyboard.iter().flatten().any(|b| b.data == data)
    }
}

pub struct FaqItem {
    pub question: &'static str,
    pub answer: &'static str,
}

pub const FAQ_ITEMS: &[FaqItem] = &[
    FaqItem {
        question: "How do I top up my balance?",
        answer: "Choose \"Top up balance\" in the main menu and follow the steps.",
    },
    FaqItem {
        question: "How do I check my account?",
        answer: "Open \"My account\" in the main menu to see your profile, subscription and balance.",
    },
];

pub struct Chatbot {
    pub slug: &'static str,
    pub label: &'static str,
    pub link: &'static str,
}

pub const CHATBOTS: &[Chatbot] = &[
    Chatbot {
        slug: "karta_klienta",
        label: "Client card",
        link: "https://chatgpt.com/g/g-AAZLzsVUt-karta-",
    },
    Chatbot {
        slug: "psixoterapevt",
        label: "Psychotherapist",
        link: "https://chatgpt.com/g/g-eyMvqlNiM-psikhoterapevt",
    },
    Chatbot {
        slug: "kpt",
        label: "CBT",
        link: "https://chatgpt.com/g/g-cZG535IXC-final-kpt-klaud",
    },
    Chatbot {
        slug: "etpr",
        label: "ERP",
        link: "https://chatgpt.com/g/g-0JYTCDgTg-2ekspozitsionnaia-terapiia-s-predotvrashchen-etpr-erp",
    },
    Chatbot {
        slug: "tpo",
        label: "ACT",
        link: "https://chatgpt.com/g/g-VwRfjHabS-iact-2",
    },
    Chatbot {
        slug: "mkt",
        label: "Metacognitive therapy",
        link: "https://chatgpt.com/g/g-v10DeVqh6-metakognitivnaia-terapiia-mkt",
    },
    Chatbot {
        slug: "asoznonost",
        label: "Mindfulness",
        link: "https://chatgpt.com/g/g-ugnxXY2jQ-2-midlness",
    },
    Chatbot {
        slug: "upravleniya_trevozhnostyu",
        label: "Anxiety management",
        link: "https://chatgpt.com/g/g-WVMzU9zuB-2-upravlenie-trevozhnostyu",
    },
    Chatbot {
        slug: "terapevticheskiy_pismo",
        label: "Therapeutic writing",
        link: "https://chatgpt.com/g/g-Dw5eNVKOe-2-terapevticheskoe-pismo",
    },
    Chatbot {
        slug: "kft",
        label: "Brief therapy",
        link: "https://chatgpt.com/g/g-Sc8zMP0vZ-2-kratkosrochnaia",
    },
    Chatbot {
        slug: "dpt",
        label: "DBT",
        link: "https://chatgpt.com/g/g-DwyXSdVET-2dpt",
    },
    Chatbot {
        slug: "sxemoterapiya",
        label: "Schema therapy",
        link: "https://chatgpt.com/g/g-OP639c1bE-2skhemoterapiya",
    },
    Chatbot {
        slug: "ipt",
        label: "Interpersonal therapy",
        link: "https://chatgpt.com/g/g-qUGJ1Zfr0-2-interpersonalnaia",
    },
    Chatbot {
        slug: "narrativniya_terapiya",
        label: "Narrative therapy",
        link: "https://chatgpt.com/g/g-VtOyysCkq-2-narrativnaia",
    },
];

pub const GENERIC_ERROR: &str = "Something went wrong. Please try again later.";

pub fn back_to_menu_row() -> Vec<Button> {
    vec![Button::new("Back to menu", "go_back_to_menu")]
}

pub fn main_menu_keyboard() -> Keyboard {
    vec![
        vec![Button::new("Buy a subscription", "select_plan")],
        vec![Button::new("Fill in client card", "fill_card")],
        vec![Button::new("Materials", "materials")],
        vec![Button::new("Top up balance", "recharge_balance")],
        vec![Button::new("Gift a subscription", "gift_subscription")],
        vec![Button::new("My account", "my_account")],
        vec![Button::new("Feedback", "feedback")],
        vec![Button::new("Support", "support")],
        vec![Button::new("Chatbots", "chatbots")],
    ]
}

pub fn main_menu(text: impl Into<String>) -> Reply {
    Reply::text(text).with_keyboard(main_menu_keyboard())
}

pub fn welcome() -> Reply {
    Reply::text("Welcome! Press \"Start\" to continue.")
        .with_keyboard(vec![vec![Button::new("Start", "register")]])
}

pub fn agreement() -> Reply {
    Reply::text(
        "Before we continue, please read and accept the user agreement and the \
         consent to personal data processing.",
    )
    .with_keyboard(vec![
        vec![Button::new("Accept", "accept_user_agreement")],
        vec![Button::new("Decline", "reject_user_agreement")],
    ])
}

pub fn plans_keyboard(plans: &[SubscriptionPlanResponse], prefix: &str, back: &str) -> Keyboard {
    let mut keyboard: Keyboard = plans
        .iter()
        .map(|p| {
            vec![Button::new(
                format!("{} ({} / {} days)", p.name, p.price, p.duration_days),
                format!("{prefix}{}", p.id),
            )]
        })
        .collect();
    keyboard.push(vec![Button::new("Back", back)]);
    keyboard
}

pub fn methods_keyboard(methods: &[PaymentMethodResponse], prefix: &str, back: &str) -> Keyboard {
    let mut keyboard: Keyboard = methods
        .iter()
        .map(|m| vec![Button::new(m.name.clone(), format!("{prefix}{}", m.id))])
        .collect();
    keyboard.push(vec![Button::new("Back", back)]);
    keyboard
}

pub fn faq_list() -> Reply {
    let mut text = String::from("Frequently asked questions:\n\n");
    for (i, item) in FAQ_ITEMS.iter().enumerate() {
        text.push_str(&format!("{}. {}\n", i + 1, item.question));
    }
    let mut keyboard: Keyboard = FAQ_ITEMS
        .iter()
        .enumerate()
        .map(|(i, item)| vec![Button::new(item.question, format!("faq_{}", i + 1))])
        .collect();
    keyboard.push(vec![Button::new("Message support", "send_support_message")]);
    keyboard.push(back_to_menu_row());
    Reply::text(text).with_keyboard(keyboard)
}

pub fn faq_answer(item: &FaqItem) -> Reply {
    Reply::text(format!("{}\n{}", item.question, item.answer)).with_keyboard(vec![
        vec![Button::new("Another question", "show_faq")],
        vec![Button::new("Message support", "send_support_message")],
        back_to_menu_row(),
    ])
}

pub fn materials_menu() -> Reply {
    Reply::text("Choose a material:").with_keyboard(vec![
        vec![Button::new("Methodichka", "material_methodichka")],
        vec![Button::new("Workbook", "material_workbook")],
        back_to_menu_row(),
    ])
}

pub fn chatbots_menu() -> Reply {
    let mut keyboard: Keyboard = CHATBOTS
        .iter()
        .map(|c| vec![Button::new(c.label, format!("chatbot_{}", c.slug))])
        .collect();
    keyboard.push(back_to_menu_row());
    Reply::text("Choose a chatbot:").with_keyboard(keyboard)
}

pub fn account_summary(profile: &ProfileResponse) -> String {
    let mut text = format!(
        "Your account:\nUsername: {}\nRegistered: {}\n",
        profile.username,
        profile.created.format("%Y-%m-%d")
    );
    match &profile.current_subscription {
        Some(sub) => text.push_str(&format!(
            "Current subscription: {}\nValid until: {}\n",
            sub.plan.name,
            sub.end_date.format("%Y-%m-%d")
        )),
        None => text.push_str("Current subscription: none\n"),
    }
    text.push_str(&format!(
        "Total payments: {}\nBalance: {}",
        profile.total_payments, profile.balance
    ));
    text
}
