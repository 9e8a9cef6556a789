//! Components
//!
//! A component owns some state, reads its `[components.<NAME>]` table, and
//! hands the engine an [`Intents`] declaration whose closures capture the
//! shared instance.

pub mod datetimeinfo;

use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::bus::Announcer;
use crate::config::Settings;
use crate::engine::HomeIntent;
use crate::error::Result;
use crate::intents::Intents;
use crate::rhasspy::RecognitionService;

pub use datetimeinfo::DateTimeInfo;

/// Everything the engine needs to build a component
pub struct ComponentContext<'a, C> {
    pub config: C,
    pub settings: &'a Settings,
    pub announcer: Announcer,
}

pub trait Component: Send + Sync + Sized + 'static {
    /// Name of the component's configuration table and declaration
    const NAME: &'static str;

    type Config: DeserializeOwned + Default;

    fn setup(context: ComponentContext<'_, Self::Config>) -> Result<Self>;

    fn intents(self: Arc<Self>) -> Intents;
}

/// Build `C` from its configuration and register its declaration
pub fn install<C, S>(home_intent: &mut HomeIntent<S>) -> Result<Arc<C>>
where
    C: Component,
    S: RecognitionService,
{
    let context = ComponentContext {
        config: home_intent.component_config::<C::Config>(C::NAME)?,
        settings: home_intent.settings(),
        announcer: home_intent.announcer(),
    };
    let component = Arc::new(C::setup(context)?);
    home_intent.register_component(Arc::clone(&component))?;
    Ok(component)
}

/// Install every component shipped with the crate
pub fn install_bundled<S: RecognitionService>(home_intent: &mut HomeIntent<S>) -> Result<()> {
    install::<DateTimeInfo, S>(home_intent)?;
    Ok(())
}
