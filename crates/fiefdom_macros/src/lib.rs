use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, ItemFn, LitInt, LitStr};

/// Time a map-generation stage when the `perf_stats` feature is enabled.
///
/// The function body is wrapped with a drop guard that measures wall time
/// until the function returns (including early returns through `?`).
/// Stages slower than the threshold are reported with `info!`, faster ones
/// with `debug!`. Without `perf_stats` the guard is not compiled at all.
///
/// # Arguments
/// - `threshold_ms = N`: report at info level above N milliseconds (default 1)
/// - `label = "..."`: name used in the log line (default: the function name)
///
/// # Example
/// ```ignore
/// #[profile(label = "repair", threshold_ms = 5)]
/// pub fn repair_connectivity<T: Located>(graph: &mut Graph<T>) -> Result<RepairStats, GameError> {
///     // ...
/// }
/// ```
#[proc_macro_attribute]
pub fn profile(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut threshold_ms: u128 = 1;
    let mut label: Option<LitStr> = None;

    let args_parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("threshold_ms") {
            let lit: LitInt = meta.value()?.parse()?;
            threshold_ms = lit.base10_parse()?;
            Ok(())
        } else if meta.path.is_ident("label") {
            label = Some(meta.value()?.parse()?);
            Ok(())
        } else {
            Err(meta.error("unsupported profile argument, expected `threshold_ms` or `label`"))
        }
    });
    parse_macro_input!(attr with args_parser);

    let input = parse_macro_input!(item as ItemFn);
    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;

    let stage_name = label
        .map(|lit| lit.value())
        .unwrap_or_else(|| sig.ident.to_string());

    let output = quote! {
        #(#attrs)*
        #vis #sig {
            #[cfg(feature = "perf_stats")]
            let _stage_timer = {
                struct StageTimer {
                    stage: &'static str,
                    start: std::time::Instant,
                }
                impl Drop for StageTimer {
                    fn drop(&mut self) {
                        let elapsed = self.start.elapsed();
                        if elapsed.as_millis() > #threshold_ms {
                            bevy::prelude::info!("[PERF] {}: {:?}", self.stage, elapsed);
                        } else {
                            bevy::prelude::debug!("[PERF] {}: {:?}", self.stage, elapsed);
                        }
                    }
                }
                StageTimer {
                    stage: #stage_name,
                    start: std::time::Instant::now(),
                }
            };

            #block
        }
    };

    output.into()
}
