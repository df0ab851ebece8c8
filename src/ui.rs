use iced::{
    alignment,
    widget::{
        button, checkbox, column, container, horizontal_space, pick_list, row, scrollable, text, text_input,
        Column, Row,
    },
    Color, Element, Length,
};

use crate::activity;
use crate::chat::ConversationState;
use crate::dashboard::DashboardState;
use crate::forms::{LoginForm, RegisterField, RegisterForm};
use crate::model::{Candidate, User};
use crate::render::{self, CandidateFilter, KindFilter, Side, Turn, PLATFORMS, SUMMARY_WIDTH};
use crate::routes::Route;
use crate::Message;

const MUTED: Color = Color::from_rgb(0.6, 0.62, 0.7);
const ERROR: Color = Color::from_rgb(0.95, 0.45, 0.45);
const BUBBLE_WIDTH: f32 = 560.0;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const SEARCHING: [&str; 8] = [
    "Searching for candidates...",
    "Scanning LinkedIn profiles...",
    "Browsing YouTube channels...",
    "Checking TikTok creators...",
    "Matching skills to your request...",
    "Reading through portfolios...",
    "Ranking the best fits...",
    "Almost there...",
];

pub fn timeline_id() -> scrollable::Id {
    scrollable::Id::new("timeline")
}

pub struct Banner {
    pub text: String,
    pub is_error: bool,
}

pub fn banner(banner: &Banner) -> Element<'_, Message> {
    let label = text(&banner.text).size(14);
    let label = if banner.is_error { label.color(ERROR) } else { label };
    container(
        row![label, horizontal_space(), button(text("Dismiss").size(13)).on_press(Message::DismissBanner).style(button::text)]
            .align_y(alignment::Vertical::Center)
            .spacing(10),
    )
    .padding(10)
    .width(Length::Fill)
    .style(container::rounded_box)
    .into()
}

fn back_link<'a>(label: &'a str, route: Route) -> Element<'a, Message> {
    button(text(label).size(14))
        .on_press(Message::Navigate(route))
        .style(button::text)
        .into()
}

fn centered<'a>(content: impl Into<Element<'a, Message>>) -> Element<'a, Message> {
    container(container(content).max_width(440.0))
        .width(Length::Fill)
        .height(Length::Fill)
        .align_x(alignment::Horizontal::Center)
        .align_y(alignment::Vertical::Center)
        .into()
}

fn form_error(error: Option<&str>) -> Element<'_, Message> {
    match error {
        Some(e) => text(e).size(14).color(ERROR).into(),
        None => column![].into(),
    }
}

pub fn landing(authenticated: bool) -> Element<'static, Message> {
    let features = column![
        text("• Describe the role in plain language"),
        text("• Search LinkedIn, YouTube and TikTok talent at once"),
        text("• Pick up earlier searches where you left off"),
    ]
    .spacing(6);

    let actions: Element<Message> = if authenticated {
        button(text("Open dashboard")).on_press(Message::Navigate(Route::Dashboard)).padding(12).into()
    } else {
        row![
            button(text("Get started")).on_press(Message::Navigate(Route::Register)).padding(12),
            button(text("Sign in"))
                .on_press(Message::Navigate(Route::Login))
                .padding(12)
                .style(button::secondary),
        ]
        .spacing(12)
        .into()
    };

    centered(
        column![
            text("TalentScout AI").size(36),
            text("Find the right people for any role by just asking.").size(18).color(MUTED),
            features,
            actions,
        ]
        .spacing(20),
    )
}

pub fn login<'a>(form: &'a LoginForm, busy: bool, error: Option<&'a str>) -> Element<'a, Message> {
    let mut email = text_input("Enter your email", &form.email).padding(10);
    let mut password = text_input("Enter your password", &form.password).secure(true).padding(10);
    if !busy {
        email = email.on_input(Message::LoginEmailChanged).on_submit(Message::SubmitLogin);
        password = password.on_input(Message::LoginPasswordChanged).on_submit(Message::SubmitLogin);
    }

    centered(
        column![
            back_link("← Back to home", Route::Landing),
            text("Welcome back").size(28),
            text("Sign in to continue your talent search").color(MUTED),
            text("Email address").size(14),
            email,
            text("Password").size(14),
            password,
            form_error(error),
            button(text(if busy { "Signing in..." } else { "Sign in" }))
                .on_press_maybe((!busy).then_some(Message::SubmitLogin))
                .width(Length::Fill)
                .padding(10),
            row![
                text("Don't have an account?").size(14).color(MUTED),
                back_link("Create one", Route::Register),
            ]
            .align_y(alignment::Vertical::Center),
        ]
        .spacing(10),
    )
}

fn register_input<'a>(
    placeholder: &'a str,
    value: &'a str,
    field: RegisterField,
    secure: bool,
    busy: bool,
) -> Element<'a, Message> {
    let input = text_input(placeholder, value).secure(secure).padding(10);
    if busy {
        input.into()
    } else {
        input
            .on_input(move |v| Message::RegisterChanged(field, v))
            .on_submit(Message::SubmitRegister)
            .into()
    }
}

pub fn register<'a>(form: &'a RegisterForm, busy: bool, error: Option<&'a str>) -> Element<'a, Message> {
    centered(
        column![
            back_link("← Back to home", Route::Landing),
            text("Create your account").size(28),
            text("Start finding amazing talent with AI-powered search").color(MUTED),
            text("Full name").size(14),
            register_input("Enter your full name", &form.fullname, RegisterField::FullName, false, busy),
            text("Email address").size(14),
            register_input("Enter your email", &form.email, RegisterField::Email, false, busy),
            text("Password").size(14),
            register_input("Create a password", &form.password, RegisterField::Password, true, busy),
            text("Confirm password").size(14),
            register_input("Confirm your password", &form.confirm_password, RegisterField::ConfirmPassword, true, busy),
            form_error(error),
            button(text(if busy { "Creating account..." } else { "Create account" }))
                .on_press_maybe((!busy).then_some(Message::SubmitRegister))
                .width(Length::Fill)
                .padding(10),
            row![
                text("Already have an account?").size(14).color(MUTED),
                back_link("Sign in", Route::Login),
            ]
            .align_y(alignment::Vertical::Center),
        ]
        .spacing(10),
    )
}

pub fn not_found(path: &str) -> Element<'_, Message> {
    centered(
        column![
            text("404").size(48),
            text(format!("Oops! Nothing lives at {}", path)).color(MUTED),
            back_link("Return to home", Route::Landing),
        ]
        .spacing(12)
        .align_x(alignment::Horizontal::Center),
    )
}

fn header<'a>(title: &'a str, actions: Element<'a, Message>) -> Element<'a, Message> {
    container(
        row![text(title).size(22), horizontal_space(), actions]
            .align_y(alignment::Vertical::Center)
            .spacing(12),
    )
    .padding(12)
    .width(Length::Fill)
    .into()
}

fn stat_tile<'a>(label: &'a str, value: String) -> Element<'a, Message> {
    container(column![text(label).size(13).color(MUTED), text(value).size(26)].spacing(4))
        .padding(14)
        .width(Length::Fill)
        .style(container::rounded_box)
        .into()
}

pub fn dashboard<'a>(user: &'a User, state: &'a DashboardState) -> Element<'a, Message> {
    let actions = row![
        button(text("New search")).on_press(Message::Navigate(Route::Chat { thread_id: None })),
        button(text("Sign out")).on_press(Message::Logout).style(button::secondary),
    ]
    .spacing(10);

    let mut body = column![
        text(format!("Welcome back, {}!", user.fullname)).size(26),
        text("Ready to discover amazing talent today?").color(MUTED),
    ]
    .spacing(16);

    if state.is_loading() {
        body = body.push(text("Loading your dashboard...").color(MUTED));
    }
    if let Some(error) = state.error() {
        body = body.push(text(error).color(ERROR));
    }

    if let Some(data) = state.data() {
        body = body.push(
            row![
                stat_tile("Total searches", data.recent.len().to_string()),
                stat_tile("Saved candidates", data.saved.len().to_string()),
            ]
            .spacing(12),
        );

        let recent: Element<Message> = if data.recent.is_empty() {
            text("No searches yet. Start one with \"New search\".").color(MUTED).into()
        } else {
            Column::with_children(data.recent.iter().map(|search| {
                let when = search
                    .updated_at
                    .as_deref()
                    .or(search.created_at.as_deref())
                    .map(|raw| render::clock(crate::model::parse_timestamp(raw, chrono::Utc::now())))
                    .unwrap_or_default();
                button(
                    row![text(search.display_title()), horizontal_space(), text(when).size(13).color(MUTED)]
                        .spacing(10),
                )
                .on_press(Message::Navigate(Route::Chat {
                    thread_id: Some(search.id.clone()),
                }))
                .width(Length::Fill)
                .style(button::secondary)
                .into()
            }))
            .spacing(6)
            .into()
        };
        body = body.push(text("Recent searches").size(20)).push(recent);

        body = body.push(text("Saved candidates").size(20));
        if data.saved.is_empty() {
            body = body.push(text("You haven't saved any candidates yet.").color(MUTED));
        } else {
            body = body.push(card_grid(data.saved.iter().enumerate().collect(), None));
        }
    }

    let activity_lines = activity::recent(8);
    if !activity_lines.is_empty() {
        body = body.push(text("Recent activity").size(20)).push(
            Column::with_children(activity_lines.into_iter().rev().map(|entry| {
                text(format!("{}  [{}] {}", render::clock(entry.at), entry.kind.label(), entry.text))
                    .size(13)
                    .color(MUTED)
                    .into()
            }))
            .spacing(2),
        );
    }

    column![
        header("TalentScout AI", actions.into()),
        scrollable(container(body).padding(16)).height(Length::Fill),
    ]
    .into()
}

pub struct ChatView<'a> {
    pub state: &'a ConversationState,
    pub input: &'a str,
    pub filter: &'a CandidateFilter,
    pub contact: Option<&'a Candidate>,
    pub frame: usize,
    pub input_id: text_input::Id,
}

fn filter_bar(filter: &CandidateFilter) -> Element<'_, Message> {
    let mut bar = Row::new().spacing(14).align_y(alignment::Vertical::Center);
    for platform in PLATFORMS {
        bar = bar.push(
            checkbox(platform, filter.is_platform_selected(platform))
                .on_toggle(move |_| Message::TogglePlatform(platform))
                .size(16),
        );
    }
    bar.push(horizontal_space())
        .push(pick_list(&KindFilter::ALL[..], Some(filter.kind()), Message::KindSelected).text_size(14))
        .into()
}

fn text_bubble<'a>(side: Side, content: &'a str, time: String) -> Element<'a, Message> {
    let bubble = container(text(content).size(15)).padding(10).max_width(BUBBLE_WIDTH);
    let bubble = match side {
        Side::Right => bubble.style(container::bordered_box),
        Side::Left => bubble.style(container::rounded_box),
    };
    let align = match side {
        Side::Right => alignment::Horizontal::Right,
        Side::Left => alignment::Horizontal::Left,
    };
    container(column![bubble, text(time).size(11).color(MUTED)].spacing(2).align_x(align))
        .width(Length::Fill)
        .align_x(align)
        .into()
}

fn typing_bubble(frame: usize) -> Element<'static, Message> {
    let spinner = SPINNER[frame % SPINNER.len()];
    let caption = SEARCHING[(frame / 10) % SEARCHING.len()];
    container(
        container(row![text(spinner).size(18), text(caption).size(14).color(MUTED)].spacing(8))
            .padding(10)
            .style(container::rounded_box),
    )
    .width(Length::Fill)
    .align_x(alignment::Horizontal::Left)
    .into()
}

fn candidate_card<'a>(index: usize, candidate: &'a Candidate, message_id: Option<&'a str>) -> Element<'a, Message> {
    let mut card = column![row![
        text(candidate.initial()).size(22),
        column![
            text(&candidate.name).size(17),
            text(&candidate.platform).size(12).color(MUTED),
        ]
        .spacing(2),
    ]
    .spacing(10)
    .align_y(alignment::Vertical::Center)]
    .spacing(6);

    let headline: Vec<&str> = [candidate.title.as_deref(), candidate.location.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    if !headline.is_empty() {
        card = card.push(text(headline.join(" · ")).size(13));
    }
    if let Some(experience) = &candidate.experience {
        card = card.push(text(experience).size(13).color(MUTED));
    }
    if let Some(rating) = candidate.rating {
        card = card.push(text(render::stars(rating)).size(14));
    }
    if !candidate.skills.is_empty() {
        card = card.push(text(candidate.skills.join(", ")).size(13).color(MUTED));
    }
    if let Some(summary) = &candidate.summary {
        card = card.push(text(render::truncate_display(summary, SUMMARY_WIDTH)).size(13));
    }

    let mut actions = Row::new().spacing(8);
    if !candidate.profile_url.is_empty() {
        actions = actions.push(
            button(text("Copy profile link").size(13))
                .on_press(Message::CopyProfileUrl(candidate.profile_url.clone()))
                .style(button::secondary),
        );
    }
    if let Some(id) = message_id {
        actions = actions.push(
            button(text("Contact").size(13))
                .on_press(Message::ShowContact(id.to_string(), index))
                .style(button::secondary),
        );
    }
    card = card.push(actions);

    container(card)
        .padding(12)
        .width(Length::FillPortion(1))
        .style(container::rounded_box)
        .into()
}

/// Cards two to a row. `message_id` enables the contact button.
fn card_grid<'a>(cards: Vec<(usize, &'a Candidate)>, message_id: Option<&'a str>) -> Element<'a, Message> {
    Column::with_children(cards.chunks(2).map(|pair| {
        let mut line = Row::new().spacing(10);
        for (index, candidate) in pair {
            line = line.push(candidate_card(*index, *candidate, message_id));
        }
        if pair.len() == 1 {
            line = line.push(horizontal_space().width(Length::FillPortion(1)));
        }
        line.into()
    }))
    .spacing(10)
    .into()
}

fn contact_panel(candidate: &Candidate) -> Element<'_, Message> {
    let mut lines = column![text(format!("Contact {}", candidate.name)).size(17)].spacing(4);
    let contact = &candidate.contact;
    if contact.is_empty() {
        lines = lines.push(text("No contact details available").color(MUTED));
    }
    for (label, value) in [
        ("Email", &contact.email),
        ("Phone", &contact.phone),
        ("WhatsApp", &contact.whatsapp),
    ] {
        if let Some(value) = value {
            lines = lines.push(text(format!("{}: {}", label, value)).size(14));
        }
    }
    container(
        row![lines, horizontal_space(), button(text("Close").size(13)).on_press(Message::CloseContact)]
            .spacing(10),
    )
    .padding(12)
    .width(Length::Fill)
    .style(container::bordered_box)
    .into()
}

fn turn_view<'a>(turn: Turn<'a>, frame: usize) -> Element<'a, Message> {
    match turn {
        Turn::Text { side, content, time, .. } => text_bubble(side, content, time),
        Turn::Candidates {
            id,
            summary,
            time,
            cards,
            hidden,
        } => {
            let mut block = column![text_bubble(Side::Left, summary, time)].spacing(8);
            if cards.is_empty() {
                block = block.push(text("No candidates match the active filters.").size(13).color(MUTED));
            } else {
                block = block.push(card_grid(cards, Some(id)));
                if hidden > 0 {
                    block = block.push(text(format!("{} hidden by filters", hidden)).size(12).color(MUTED));
                }
            }
            block.into()
        }
        Turn::Typing => typing_bubble(frame),
    }
}

pub fn chat(view: ChatView<'_>) -> Element<'_, Message> {
    let actions = row![
        button(text("New conversation"))
            .on_press_maybe((!view.state.is_fresh() || view.state.is_loading()).then_some(Message::NewConversation))
            .style(button::secondary),
        button(text("Dashboard")).on_press(Message::Navigate(Route::Dashboard)).style(button::secondary),
    ]
    .spacing(10);

    let timeline = Column::with_children(
        render::turns(view.state, view.filter)
            .into_iter()
            .map(|turn| turn_view(turn, view.frame)),
    )
    .spacing(14)
    .padding(16);

    let mut content = column![
        header("TalentScout AI · Chat", actions.into()),
        container(filter_bar(view.filter)).padding([0, 16]),
    ];

    if let Some(error) = view.state.error() {
        content = content.push(container(text(error).color(ERROR)).padding([0, 16]));
    }

    content = content.push(scrollable(timeline).id(timeline_id()).height(Length::Fill));

    if let Some(candidate) = view.contact {
        content = content.push(container(contact_panel(candidate)).padding([0, 16]));
    }

    let busy = view.state.is_loading();
    let mut input = text_input("Ask about candidates, skills, or requirements...", view.input)
        .id(view.input_id)
        .padding(12)
        .size(16);
    if !busy {
        input = input.on_input(Message::InputChanged).on_submit(Message::Submit);
    }
    let can_send = !busy && !view.input.trim().is_empty();

    content
        .push(
            container(
                row![input, button(text("Send")).on_press_maybe(can_send.then_some(Message::Submit)).padding(12)]
                    .spacing(10),
            )
            .padding(16),
        )
        .into()
}
