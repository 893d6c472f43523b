use crate::{
    dispatcher::Dispatcher,
    fallback::{Fallback, UnknownPropertyFallback},
    notifier::{NoopNotifier, Notifier},
    scheduler::{Scheduler, TaskQueue},
    tracer::{LogTracer, Tracer},
};
use propdispatch_schema::{Codec, NativeCodec};
use std::sync::Arc;

/// Capabilities shared by every object of one driver.
pub struct Context {
    pub tracer:     Arc<dyn Tracer>,
    pub notifier:   Arc<dyn Notifier>,
    pub scheduler:  Arc<dyn Scheduler>,
    pub codec:      Arc<dyn Codec>,
    /// Used by objects that do not set their own fallback.
    pub fallback:   Arc<dyn Fallback>,
    pub dispatcher: Arc<Dispatcher>,
}

impl Context {
    pub fn builder() -> ContextBuilder {
        ContextBuilder::default()
    }
}

impl Default for Context {
    fn default() -> Self {
        ContextBuilder::default().build_context()
    }
}

/// Every capability left unset gets a working default.
#[derive(Default)]
pub struct ContextBuilder {
    tracer:     Option<Arc<dyn Tracer>>,
    notifier:   Option<Arc<dyn Notifier>>,
    scheduler:  Option<Arc<dyn Scheduler>>,
    codec:      Option<Arc<dyn Codec>>,
    fallback:   Option<Arc<dyn Fallback>>,
    dispatcher: Option<Arc<Dispatcher>>,
}

impl ContextBuilder {
    pub fn tracer(mut self, tracer: Arc<dyn Tracer>) -> Self {
        self.tracer = Some(tracer);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn codec(mut self, codec: Arc<dyn Codec>) -> Self {
        self.codec = Some(codec);
        self
    }

    pub fn fallback(mut self, fallback: Arc<dyn Fallback>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn dispatcher(mut self, dispatcher: Arc<Dispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    pub fn build(self) -> Arc<Context> {
        Arc::new(self.build_context())
    }

    fn build_context(self) -> Context {
        Context {
            tracer:     self.tracer.unwrap_or_else(|| Arc::new(LogTracer::default())),
            notifier:   self.notifier.unwrap_or_else(|| Arc::new(NoopNotifier)),
            scheduler:  self.scheduler.unwrap_or_else(|| Arc::new(TaskQueue::new())),
            codec:      self.codec.unwrap_or_else(|| Arc::new(NativeCodec)),
            fallback:   self.fallback.unwrap_or_else(|| Arc::new(UnknownPropertyFallback)),
            dispatcher: self.dispatcher.unwrap_or_default(),
        }
    }
}
