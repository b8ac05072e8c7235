use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(feature = "ssr")] {
        use axum::extract::FromRef;
        use leptos::prelude::LeptosOptions;

        use crate::config::HostConfig;
        use crate::proxy::ProxyClient;

        #[derive(FromRef, Clone)]
        pub struct AppState {
            pub leptos_options: LeptosOptions,
            pub proxy: ProxyClient,
        }

        impl AppState {
            pub fn new(leptos_options: LeptosOptions, config: &HostConfig) -> anyhow::Result<Self> {
                Ok(Self {
                    leptos_options,
                    proxy: ProxyClient::new(config)?,
                })
            }
        }
    }
}
