mod activity;
mod api;
mod chat;
mod config;
mod dashboard;
mod dispatch;
mod error;
mod forms;
mod hydrate;
mod model;
mod render;
mod routes;
mod session;
mod storage;
#[cfg(test)]
mod testing;
mod ui;

use iced::{
    clipboard,
    event::{self, Event as IcedEvent},
    keyboard::{self, Key},
    time,
    widget::{column, container, scrollable, text_input},
    window, Element, Length, Subscription, Task, Theme,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use activity::Kind;
use api::{LoginResponse, ScoutApi, ScoutClient};
use chat::{reduce, ChatAction, ConversationState};
use dashboard::{DashboardData, DashboardState};
use error::ApiError;
use forms::{LoginForm, RegisterField, RegisterForm};
use model::{Candidate, ChatMessage};
use render::{CandidateFilter, KindFilter};
use routes::{gate, Route};
use session::SessionStore;
use storage::Storage;
use ui::Banner;

const SESSION_EXPIRED: &str = "Your session may have expired. Please sign in again.";

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TALENT_SCOUT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn main() -> iced::Result {
    init_tracing();
    let config = config::Config::load();

    let storage = match Storage::open_default() {
        Ok(storage) => storage,
        Err(e) => {
            tracing::warn!("session storage unavailable, sign-in will not persist: {}", e);
            match Storage::in_memory() {
                Ok(storage) => storage,
                Err(e) => {
                    tracing::error!("could not open any session storage: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let client = ScoutClient::with_config(config.api.base_url.clone());
    tracing::info!("using API at {}", client.base_url());
    let api: Arc<dyn ScoutApi> = Arc::new(client);
    let start = std::env::args().nth(1).map(|path| Route::parse(&path));

    iced::application("TalentScout AI", App::update, App::view)
        .theme(App::theme)
        .subscription(App::subscription)
        .window(window::Settings {
            size: iced::Size::new(config.window.width as f32, config.window.height as f32),
            min_size: Some(iced::Size::new(
                config.window.min_width as f32,
                config.window.min_height as f32,
            )),
            position: window::Position::Centered,
            ..Default::default()
        })
        .run_with(move || App::new(api, SessionStore::new(storage), start))
}

#[derive(Debug, Clone)]
pub enum Message {
    Navigate(Route),
    LoginEmailChanged(String),
    LoginPasswordChanged(String),
    SubmitLogin,
    LoginFinished(Result<LoginResponse, ApiError>),
    RegisterChanged(RegisterField, String),
    SubmitRegister,
    RegisterFinished(Result<String, ApiError>),
    Logout,
    DashboardLoaded(u64, Result<DashboardData, ApiError>),
    InputChanged(String),
    Submit,
    SearchFinished(u64, Result<Vec<Candidate>, ApiError>),
    HistoryLoaded(u64, Result<Vec<ChatMessage>, ApiError>),
    NewConversation,
    TogglePlatform(&'static str),
    KindSelected(KindFilter),
    ShowContact(String, usize),
    CloseContact,
    CopyProfileUrl(String),
    DismissBanner,
    Escape,
    Tick,
}

struct App {
    api: Arc<dyn ScoutApi>,
    session: SessionStore,
    route: Route,
    login: LoginForm,
    register: RegisterForm,
    form_error: Option<String>,
    banner: Option<Banner>,
    dashboard: DashboardState,
    chat: ConversationState,
    input_text: String,
    filter: CandidateFilter,
    contact: Option<(String, usize)>,
    loading_frame: usize,
    input_id: text_input::Id,
}

impl App {
    fn new(api: Arc<dyn ScoutApi>, mut session: SessionStore, start: Option<Route>) -> (Self, Task<Message>) {
        // The stored session must be in place before the first route is gated.
        if session.restore_session() {
            tracing::info!("restored stored session");
        }

        let mut app = App {
            api,
            session,
            route: Route::Landing,
            login: LoginForm::default(),
            register: RegisterForm::default(),
            form_error: None,
            banner: None,
            dashboard: DashboardState::default(),
            chat: ConversationState::default(),
            input_text: String::new(),
            filter: CandidateFilter::default(),
            contact: None,
            loading_frame: 0,
            input_id: text_input::Id::unique(),
        };

        let task = match start {
            Some(route) => app.navigate(route),
            None => Task::none(),
        };
        (app, task)
    }

    fn info(&mut self, text: impl Into<String>) {
        self.banner = Some(Banner {
            text: text.into(),
            is_error: false,
        });
    }

    fn alert(&mut self, text: impl Into<String>) {
        self.banner = Some(Banner {
            text: text.into(),
            is_error: true,
        });
    }

    fn scroll_to_end() -> Task<Message> {
        scrollable::snap_to(ui::timeline_id(), scrollable::RelativeOffset::END)
    }

    fn navigate(&mut self, requested: Route) -> Task<Message> {
        if matches!(self.route, Route::Chat { .. }) {
            // Anything still in flight for the old view becomes stale.
            reduce(&mut self.chat, ChatAction::Detach);
            self.contact = None;
        }

        let route = gate(requested, self.session.is_authenticated());
        tracing::debug!("navigating to {}", route.path());
        self.route = route.clone();

        match route {
            Route::Login | Route::Register => {
                self.form_error = None;
                self.session.clear_error();
                Task::none()
            }
            Route::Dashboard => self.load_dashboard(),
            Route::Chat { thread_id: Some(thread_id) } => {
                let Some(token) = self.session.token().map(str::to_string) else {
                    return Task::none();
                };
                let generation = hydrate::begin(&mut self.chat);
                let api = self.api.clone();
                Task::batch([
                    Task::future(async move {
                        let result = hydrate::fetch(api.as_ref(), &token, &thread_id).await;
                        Message::HistoryLoaded(generation, result)
                    }),
                    text_input::focus(self.input_id.clone()),
                ])
            }
            Route::Chat { thread_id: None } => {
                reduce(&mut self.chat, ChatAction::Reset);
                text_input::focus(self.input_id.clone())
            }
            Route::Landing | Route::NotFound(_) => Task::none(),
        }
    }

    fn load_dashboard(&mut self) -> Task<Message> {
        let (Some(token), Some(user)) = (self.session.token(), self.session.user()) else {
            return Task::none();
        };
        let token = token.to_string();
        let user_id = user.id.clone();
        let generation = self.dashboard.begin();
        let api = self.api.clone();
        Task::future(async move {
            let result = dashboard::load(api.as_ref(), &token, &user_id).await;
            Message::DashboardLoaded(generation, result)
        })
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Navigate(route) => self.navigate(route),
            Message::LoginEmailChanged(value) => {
                self.login.email = value;
                Task::none()
            }
            Message::LoginPasswordChanged(value) => {
                self.login.password = value;
                Task::none()
            }
            Message::SubmitLogin => {
                if let Err(e) = self.login.validate() {
                    self.form_error = Some(e.to_string());
                    return Task::none();
                }
                self.form_error = None;
                if !self.session.start_request() {
                    return Task::none();
                }
                let api = self.api.clone();
                let form = self.login.clone();
                Task::perform(
                    async move { SessionStore::login(api.as_ref(), &form).await },
                    Message::LoginFinished,
                )
            }
            Message::LoginFinished(result) => match self
                .session
                .finish_login(result)
                .map(|user| format!("Welcome back, {}!", user.fullname))
            {
                Ok(greeting) => {
                    self.info(greeting);
                    self.login = LoginForm::default();
                    self.navigate(Route::Dashboard)
                }
                Err(reason) => {
                    self.alert(reason);
                    Task::none()
                }
            },
            Message::RegisterChanged(field, value) => {
                self.register.set(field, value);
                Task::none()
            }
            Message::SubmitRegister => {
                if let Err(e) = self.register.validate() {
                    self.form_error = Some(e.to_string());
                    return Task::none();
                }
                self.form_error = None;
                if !self.session.start_request() {
                    return Task::none();
                }
                let api = self.api.clone();
                let form = self.register.clone();
                Task::perform(
                    async move { SessionStore::register(api.as_ref(), &form).await },
                    Message::RegisterFinished,
                )
            }
            Message::RegisterFinished(result) => match self.session.finish_register(result) {
                Ok(_) => {
                    self.info("Account created! Please sign in.");
                    self.login.email = self.register.email.trim().to_string();
                    self.register = RegisterForm::default();
                    self.navigate(Route::Login)
                }
                Err(reason) => {
                    self.alert(reason);
                    Task::none()
                }
            },
            Message::Logout => {
                self.session.logout();
                reduce(&mut self.chat, ChatAction::Reset);
                self.dashboard.clear();
                self.input_text.clear();
                self.info("You have been signed out.");
                self.navigate(Route::Landing)
            }
            Message::DashboardLoaded(generation, result) => {
                let expired = matches!(result, Err(ApiError::Unauthorized(_)));
                if self.dashboard.complete(generation, result) && expired {
                    self.alert(SESSION_EXPIRED);
                }
                Task::none()
            }
            Message::InputChanged(value) => {
                self.input_text = value;
                Task::none()
            }
            Message::Submit => {
                let Some(token) = self.session.token().map(str::to_string) else {
                    return Task::none();
                };
                let Some(pending) = dispatch::begin(&mut self.chat, &self.input_text) else {
                    return Task::none();
                };
                self.input_text.clear();
                self.loading_frame = 0;
                let api = self.api.clone();
                Task::batch([
                    Task::future(async move {
                        let result = dispatch::send(api.as_ref(), &token, &pending.query).await;
                        Message::SearchFinished(pending.generation, result)
                    }),
                    Self::scroll_to_end(),
                ])
            }
            Message::SearchFinished(generation, result) => {
                if matches!(result, Err(ApiError::Unauthorized(_))) && generation == self.chat.generation() {
                    self.alert(SESSION_EXPIRED);
                }
                if dispatch::complete(&mut self.chat, generation, result) {
                    Task::batch([Self::scroll_to_end(), text_input::focus(self.input_id.clone())])
                } else {
                    Task::none()
                }
            }
            Message::HistoryLoaded(generation, result) => {
                if hydrate::complete(&mut self.chat, generation, result) {
                    Self::scroll_to_end()
                } else {
                    Task::none()
                }
            }
            Message::NewConversation => {
                reduce(&mut self.chat, ChatAction::Reset);
                activity::log_with(Kind::Search, "Started a new conversation");
                self.contact = None;
                self.input_text.clear();
                // Drop the thread id so the fresh conversation isn't re-hydrated.
                self.route = Route::Chat { thread_id: None };
                text_input::focus(self.input_id.clone())
            }
            Message::TogglePlatform(platform) => {
                self.filter.toggle_platform(platform);
                Task::none()
            }
            Message::KindSelected(kind) => {
                self.filter.set_kind(kind);
                Task::none()
            }
            Message::ShowContact(message_id, index) => {
                self.contact = Some((message_id, index));
                Task::none()
            }
            Message::CloseContact => {
                self.contact = None;
                Task::none()
            }
            Message::CopyProfileUrl(url) => {
                activity::log(format!("Copied {}", url));
                self.info("Profile link copied to clipboard");
                clipboard::write(url)
            }
            Message::DismissBanner => {
                self.banner = None;
                Task::none()
            }
            Message::Escape => {
                if self.contact.is_some() {
                    self.contact = None;
                } else {
                    self.banner = None;
                }
                Task::none()
            }
            Message::Tick => {
                if self.chat.is_loading() {
                    self.loading_frame = (self.loading_frame + 1) % 80;
                }
                Task::none()
            }
        }
    }

    fn subscription(&self) -> Subscription<Message> {
        let timer = if self.chat.is_loading() {
            time::every(Duration::from_millis(80)).map(|_| Message::Tick)
        } else {
            Subscription::none()
        };

        let events = event::listen_with(|event, _status, _id| {
            if let IcedEvent::Keyboard(keyboard::Event::KeyPressed {
                key: Key::Named(keyboard::key::Named::Escape),
                ..
            }) = event
            {
                Some(Message::Escape)
            } else {
                None
            }
        });

        Subscription::batch([timer, events])
    }

    fn selected_contact(&self) -> Option<&Candidate> {
        let (message_id, index) = self.contact.as_ref()?;
        self.chat
            .messages()
            .iter()
            .find(|m| m.id() == message_id)?
            .candidate_list()
            .get(*index)
    }

    fn view(&self) -> Element<'_, Message> {
        let error = self.form_error.as_deref().or(self.session.error());
        let busy = self.session.is_loading();

        let page: Element<Message> = match &self.route {
            Route::Landing => ui::landing(self.session.is_authenticated()),
            Route::Login => ui::login(&self.login, busy, error),
            Route::Register => ui::register(&self.register, busy, error),
            Route::Dashboard => match self.session.user() {
                Some(user) => ui::dashboard(user, &self.dashboard),
                None => ui::landing(false),
            },
            Route::Chat { .. } => ui::chat(ui::ChatView {
                state: &self.chat,
                input: &self.input_text,
                filter: &self.filter,
                contact: self.selected_contact(),
                frame: self.loading_frame,
                input_id: self.input_id.clone(),
            }),
            Route::NotFound(path) => ui::not_found(path),
        };

        let mut content = column![].spacing(8).padding(10);
        if let Some(banner) = &self.banner {
            content = content.push(ui::banner(banner));
        }

        container(content.push(page))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn theme(&self) -> Theme {
        Theme::TokyoNight
    }
}
