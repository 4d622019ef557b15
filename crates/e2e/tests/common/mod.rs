//! In-process stand-in for the devices app.
//!
//! `FakeApp` serves the devices API with axum; `FakePage` is a `Driver`
//! that renders the listing from the same store. Like the real UI, the
//! rendered listing only changes on navigation, reload or a UI action, so
//! API-side changes stay invisible until `reload`.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use std::path::Path as FsPath;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use devices_e2e::{Device, DeviceId, Driver, E2eError, E2eResult, NewDevice, SuiteConfig, WaitState};

#[derive(Default)]
struct Store {
    devices: Vec<Device>,
    next_id: u64,
    requests: Vec<String>,
}

impl Store {
    fn insert(&mut self, device: NewDevice) -> Device {
        self.next_id += 1;
        let device = Device {
            id: DeviceId::new(self.next_id.to_string()),
            system_name: device.system_name,
            hdd_capacity: device.hdd_capacity,
            device_type: device.device_type,
        };
        self.devices.push(device.clone());
        device
    }
}

#[derive(Clone, Default)]
pub struct FakeApp {
    store: Arc<Mutex<Store>>,
}

impl FakeApp {
    pub fn with_devices(devices: Vec<NewDevice>) -> Self {
        let app = Self::default();
        {
            let mut store = app.store.lock().unwrap();
            for device in devices {
                store.insert(device);
            }
        }
        app
    }

    /// Serve the API on an ephemeral port and point a config at it
    pub async fn serve(&self) -> SuiteConfig {
        let router = Router::new()
            .route("/devices", get(list_devices).post(create_device))
            .route("/devices/:id", put(update_device).delete(delete_device))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        SuiteConfig {
            host: "http://127.0.0.1".to_string(),
            ui_port: port,
            api_port: port,
            devices_path: "/devices".to_string(),
        }
    }

    pub fn devices(&self) -> Vec<Device> {
        self.store.lock().unwrap().devices.clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.devices().into_iter().map(|d| d.system_name).collect()
    }

    pub fn requests(&self) -> Vec<String> {
        self.store.lock().unwrap().requests.clone()
    }

    /// Requests other than listing
    pub fn mutating_requests(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|r| !r.starts_with("GET "))
            .collect()
    }

    fn log(&self, request: String) {
        self.store.lock().unwrap().requests.push(request);
    }
}

pub fn seed() -> Vec<NewDevice> {
    vec![
        NewDevice::parse("DESKTOP-SMART", "10", "WINDOWS_WORKSTATION").unwrap(),
        NewDevice::parse("LINUX-GATEWAY", "128", "WINDOWS_SERVER").unwrap(),
        NewDevice::parse("MAC-LOCAL-FREDDY", "256", "MAC").unwrap(),
    ]
}

async fn list_devices(State(app): State<FakeApp>) -> Json<Vec<Device>> {
    app.log("GET /devices".to_string());
    Json(app.devices())
}

async fn create_device(
    State(app): State<FakeApp>,
    Json(body): Json<NewDevice>,
) -> (StatusCode, Json<Device>) {
    app.log("POST /devices".to_string());
    let device = app.store.lock().unwrap().insert(body);
    (StatusCode::CREATED, Json(device))
}

async fn update_device(
    State(app): State<FakeApp>,
    Path(id): Path<String>,
    Json(body): Json<NewDevice>,
) -> Result<Json<Device>, StatusCode> {
    app.log(format!("PUT /devices/{}", id));
    let mut store = app.store.lock().unwrap();
    let device = store
        .devices
        .iter_mut()
        .find(|d| d.id.as_str() == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    device.system_name = body.system_name;
    device.hdd_capacity = body.hdd_capacity;
    device.device_type = body.device_type;
    Ok(Json(device.clone()))
}

async fn delete_device(State(app): State<FakeApp>, Path(id): Path<String>) -> StatusCode {
    app.log(format!("DELETE /devices/{}", id));
    let mut store = app.store.lock().unwrap();
    let before = store.devices.len();
    store.devices.retain(|d| d.id.as_str() != id);
    if store.devices.len() < before {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}

#[derive(Default)]
struct Form {
    system_name: String,
    hdd_capacity: String,
    device_type: Option<String>,
}

#[derive(Default)]
struct PageState {
    rendered: Vec<Device>,
    form: Option<Form>,
}

/// Browser double rendering the `FakeApp` store
pub struct FakePage {
    app: FakeApp,
    state: Mutex<PageState>,
    calls: Mutex<Vec<String>>,
    frozen: AtomicBool,
}

fn no_match(selector: &str) -> E2eError {
    E2eError::Playwright(format!("no element matches {}", selector))
}

/// Split `.device-main-box:has(.device-name:text-matches("PATTERN")) >> .child`
/// into the literal name and the child
fn parse_row(selector: &str) -> Option<(String, Option<&str>)> {
    let rest = selector.strip_prefix(r#".device-main-box:has(.device-name:text-matches(""#)?;
    let (quoted, child) = match rest.find(r#"")) >> "#) {
        Some(i) => (&rest[..i], Some(&rest[i + 7..])),
        None => (rest.strip_suffix(r#""))"#)?, None),
    };
    // Undo the selector quoting, then the pattern escaping
    Some((unescape(&unescape(quoted)), child))
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            c => out.push(c),
        }
    }
    out
}

impl FakePage {
    pub fn new(app: FakeApp) -> Self {
        Self {
            app,
            state: Mutex::new(PageState::default()),
            calls: Mutex::new(Vec::new()),
            frozen: AtomicBool::new(false),
        }
    }

    /// Stop reloads from picking up API-side changes
    pub fn freeze(&self) {
        self.frozen.store(true, Ordering::SeqCst);
    }

    /// Open the listing, as the runner does before each scenario
    pub async fn goto_base(&self, config: &SuiteConfig) {
        self.goto(&config.base_url()).await.unwrap();
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn render(&self) {
        let mut state = self.state.lock().unwrap();
        state.rendered = self.app.devices();
        state.form = None;
    }

    fn row(&self, name: &str) -> Option<Device> {
        let state = self.state.lock().unwrap();
        state
            .rendered
            .iter()
            .find(|d| d.system_name.contains(name))
            .cloned()
    }

    fn submit_form(&self) -> E2eResult<()> {
        let form = self
            .state
            .lock()
            .unwrap()
            .form
            .take()
            .ok_or_else(|| no_match(".submitButton"))?;
        let device = NewDevice::parse(
            &form.system_name,
            &form.hdd_capacity,
            form.device_type.as_deref().unwrap_or(""),
        )?;
        self.app.store.lock().unwrap().insert(device);
        self.render();
        Ok(())
    }

    fn with_form(&self, selector: &str, edit: impl FnOnce(&mut Form)) -> E2eResult<()> {
        let mut state = self.state.lock().unwrap();
        let form = state.form.as_mut().ok_or_else(|| no_match(selector))?;
        edit(form);
        Ok(())
    }
}

#[async_trait]
impl Driver for FakePage {
    async fn new_page(&self) -> E2eResult<()> {
        self.record("new_page".to_string());
        *self.state.lock().unwrap() = PageState::default();
        Ok(())
    }

    async fn goto(&self, url: &str) -> E2eResult<()> {
        self.record(format!("goto {}", url));
        self.render();
        Ok(())
    }

    async fn click(&self, selector: &str) -> E2eResult<()> {
        self.record(format!("click {}", selector));
        match selector {
            r#"a[href="/devices/add"]"# => {
                self.state.lock().unwrap().form = Some(Form::default());
                Ok(())
            }
            "#type" => self.with_form(selector, |_| {}),
            ".submitButton" => self.submit_form(),
            _ => match parse_row(selector) {
                Some((name, Some(".device-remove"))) => {
                    let device = self.row(&name).ok_or_else(|| no_match(selector))?;
                    self.app
                        .store
                        .lock()
                        .unwrap()
                        .devices
                        .retain(|d| d.id != device.id);
                    self.render();
                    Ok(())
                }
                _ => Err(no_match(selector)),
            },
        }
    }

    async fn fill(&self, selector: &str, value: &str) -> E2eResult<()> {
        self.record(format!("fill {} {}", selector, value));
        match selector {
            "#system_name" => self.with_form(selector, |f| f.system_name = value.to_string()),
            "#hdd_capacity" => self.with_form(selector, |f| f.hdd_capacity = value.to_string()),
            _ => Err(no_match(selector)),
        }
    }

    async fn select_option(&self, selector: &str, value: &str) -> E2eResult<()> {
        self.record(format!("select {} {}", selector, value));
        match selector {
            "#type" => self.with_form(selector, |f| f.device_type = Some(value.to_string())),
            _ => Err(no_match(selector)),
        }
    }

    async fn inner_text(&self, selector: &str) -> E2eResult<String> {
        self.record(format!("inner_text {}", selector));
        let (name, child) = parse_row(selector).ok_or_else(|| no_match(selector))?;
        let device = self.row(&name).ok_or_else(|| no_match(selector))?;
        match child {
            Some(".device-name") => Ok(device.system_name),
            Some(".device-type") => Ok(device.device_type.to_string()),
            Some(".device-capacity") => Ok(format!("{} GB", device.hdd_capacity)),
            _ => Err(no_match(selector)),
        }
    }

    async fn all_inner_texts(&self, selector: &str) -> E2eResult<Vec<String>> {
        self.record(format!("all_inner_texts {}", selector));
        match selector {
            ".device-main-box .device-name" => Ok(self
                .state
                .lock()
                .unwrap()
                .rendered
                .iter()
                .map(|d| d.system_name.clone())
                .collect()),
            _ => Ok(Vec::new()),
        }
    }

    async fn wait_for(&self, selector: &str, state: WaitState) -> E2eResult<bool> {
        self.record(format!("wait_for {} {:?}", selector, state));
        // Like Playwright, a selector it cannot parse is an error, not a miss
        let exists = match parse_row(selector) {
            Some((name, None | Some(".device-edit") | Some(".device-remove"))) => {
                self.row(&name).is_some()
            }
            Some(_) => false,
            None => {
                return Err(E2eError::Playwright(format!(
                    "Unexpected token in selector {}",
                    selector
                )))
            }
        };
        Ok(match state {
            WaitState::Visible | WaitState::Attached => exists,
            WaitState::Hidden | WaitState::Detached => !exists,
        })
    }

    async fn reload(&self) -> E2eResult<()> {
        self.record("reload".to_string());
        if !self.frozen.load(Ordering::SeqCst) {
            self.render();
        }
        Ok(())
    }

    async fn screenshot(&self, path: &FsPath) -> E2eResult<()> {
        self.record(format!("screenshot {}", path.display()));
        Ok(())
    }
}
