use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, ItemFn, LitInt};

/// Time a function when the `perf_stats` feature is enabled.
///
/// The function body is wrapped in a guard that measures wall-clock time and
/// logs through `tracing::info!` on exit when the call took longer than the
/// threshold. The threshold is given in microseconds because a solver stage
/// for a few dozen particles is far below a millisecond on the host.
///
/// Without `perf_stats` the guard is compiled out entirely; the attribute
/// leaves the function untouched.
///
/// # Example
/// ```ignore
/// #[profile]          // default threshold: 1000 µs
/// pub fn step(&mut self) { ... }
///
/// #[profile(250)]     // log anything slower than 250 µs
/// pub fn relax_density(...) { ... }
/// ```
#[proc_macro_attribute]
pub fn profile(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    let threshold_us: u128 = if attr.is_empty() {
        1_000
    } else {
        let lit = parse_macro_input!(attr as LitInt);
        match lit.base10_parse::<u128>() {
            Ok(value) => value,
            Err(err) => return err.to_compile_error().into(),
        }
    };

    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;
    let fn_name_str = sig.ident.to_string();

    let output = quote! {
        #(#attrs)*
        #vis #sig {
            #[cfg(feature = "perf_stats")]
            let _profile_timer = {
                struct ProfileGuard {
                    name: &'static str,
                    start: ::std::time::Instant,
                }
                impl Drop for ProfileGuard {
                    fn drop(&mut self) {
                        let elapsed = self.start.elapsed();
                        if elapsed.as_micros() > #threshold_us {
                            ::tracing::info!("[PERF] {}: {:?}", self.name, elapsed);
                        }
                    }
                }
                ProfileGuard {
                    name: #fn_name_str,
                    start: ::std::time::Instant::now(),
                }
            };

            #block
        }
    };

    output.into()
}
