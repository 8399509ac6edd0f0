use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, FnArg, ItemFn, LitStr};

/// Times a client operation and reports it through the reporter.
///
/// Apply to a method that returns a `Result`. The operation id is the function name, optionally
/// prefixed with `prefix = "..."`. Methods with a `self` receiver report through `self.reporter`;
/// associated functions must take an argument named `reporter` instead, which stays available to
/// the function body.
///
/// The outcome is captured from the final expression of the body, so instrumented functions
/// should produce their result as a tail expression rather than through early returns.
#[proc_macro_attribute]
pub fn page_tunnel_instrument(attr: TokenStream, input: TokenStream) -> TokenStream {
    let mut prefix = String::new();
    if !attr.is_empty() {
        let parser = syn::meta::parser(|meta| {
            if meta.path.is_ident("prefix") {
                let value: LitStr = meta.value()?.parse()?;
                prefix = value.value();
                Ok(())
            } else {
                Err(meta.error("expected `prefix = \"...\"`"))
            }
        });
        parse_macro_input!(attr with parser);
    }

    let input = parse_macro_input!(input as ItemFn);
    let operation_id = format!("{}{}", prefix, input.sig.ident);

    let has_receiver = matches!(input.sig.inputs.first(), Some(FnArg::Receiver(_)));
    let reporter = if has_receiver {
        quote!(self.reporter.clone())
    } else {
        quote!(reporter.clone())
    };

    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;

    TokenStream::from(quote! {
        #(#attrs)*
        #vis #sig {
            let __reporter = #reporter;
            let __record = ::page_tunnel_instruments::OperationRecord::new(#operation_id);
            let __result = #block;
            __reporter.add_operation(__record.finish(__result.is_err()));
            __result
        }
    })
}
