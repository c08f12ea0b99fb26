/// The only thing the canvas needs from an auth provider: whether someone is
/// signed in, and a way to ask them to sign in.
pub trait AuthGate {
    fn is_signed_in(&self) -> bool;

    /// Ask the user to sign in (e.g. open a sign-in prompt)
    fn request_sign_in(&mut self);
}

/// In-app session standing in for a real provider.
///
/// Signing in only flips a flag; the prompt is a modal the app draws while
/// `prompt_open` is set.
#[derive(Debug, Default, Clone)]
pub struct LocalSession {
    signed_in: bool,
    prompt_open: bool,
}

impl LocalSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_prompt_open(&self) -> bool {
        self.prompt_open
    }

    pub fn sign_in(&mut self) {
        log::info!("Session signed in");
        self.signed_in = true;
        self.prompt_open = false;
    }

    pub fn sign_out(&mut self) {
        log::info!("Session signed out");
        self.signed_in = false;
    }

    /// Close the prompt without signing in
    pub fn dismiss_prompt(&mut self) {
        self.prompt_open = false;
    }
}

impl AuthGate for LocalSession {
    fn is_signed_in(&self) -> bool {
        self.signed_in
    }

    fn request_sign_in(&mut self) {
        self.prompt_open = true;
    }
}
