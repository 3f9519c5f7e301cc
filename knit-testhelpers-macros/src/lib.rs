use proc_macro2::Literal;
use unsynn::*;

keyword! {
    KFn = "fn";
}

unsynn! {
    // attributes, visibility and qualifiers ahead of `fn`
    struct Prelude {
        items: Any<Cons<Except<KFn>, TokenTree>>,
    }

    // generics, arguments and return type
    struct Signature {
        items: Any<Cons<Except<BraceGroup>, TokenTree>>,
    }

    struct TestFn {
        prelude: Prelude, _fn: KFn, name: Ident,
        signature: Signature, body: BraceGroup
    }
}

impl quote::ToTokens for Prelude {
    fn to_tokens(&self, tokens: &mut unsynn::TokenStream) {
        self.items.to_tokens(tokens)
    }
}

impl quote::ToTokens for Signature {
    fn to_tokens(&self, tokens: &mut unsynn::TokenStream) {
        self.items.to_tokens(tokens)
    }
}

/// Marks a test that runs with the knit tracing harness.
///
/// The generated test installs the shared subscriber and runs its body
/// inside a span named after the function.
///
/// ```ignore
/// #[knit_testhelpers::test]
/// fn parses_nested_arrays() {
///     // events here are tagged with `parses_nested_arrays`
/// }
/// ```
///
/// Another test attribute can be given as an argument, e.g.
/// `#[knit_testhelpers::test(other::test)]`.
#[proc_macro_attribute]
pub fn test(
    attr: proc_macro::TokenStream,
    item: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    let item = TokenStream::from(item);
    let mut tokens = item.to_token_iter();
    let TestFn {
        prelude,
        _fn,
        name,
        signature,
        body,
    } = match tokens.parse::<TestFn>() {
        Ok(f) => f,
        Err(err) => {
            let message = Literal::string(&format!("expected a test function: {err:?}"));
            return quote::quote! { ::core::compile_error!(#message); }.into();
        }
    };

    let test_attr = if attr.is_empty() {
        quote::quote! { #[::core::prelude::rust_2024::test] }
    } else {
        let attr = TokenStream::from(attr);
        quote::quote! { #[#attr] }
    };

    let test_name = Literal::string(&name.to_string());
    let statements = body.0.stream();

    quote::quote! {
        #test_attr
        #prelude fn #name #signature {
            let _test_span = ::knit_testhelpers::enter_test(#test_name);
            #statements
        }
    }
    .into()
}
