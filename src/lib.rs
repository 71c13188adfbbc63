/*
 *  Agon - Discord bot for running team tournaments inside Discord servers.
 *  Copyright (C) 2026  The Agon developers
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */
/*
 * The library target exists only to host the attribute macro below:
 * procedural macros must be defined in their own (proc-macro) library.
 */
extern crate proc_macro;
use proc_macro::TokenStream;
use quote::ToTokens as _; // For command.into_token_stream().
use syn::spanned::Spanned as _; // For span() on language items.
use syn::{parse_macro_input, parse_quote, ItemFn, Stmt};

/**
 * Attribute macro that makes a poise command log its own invocations.
 *
 * The command's first argument must be the poise context. A statement
 * expanding to `crate::utils::log_cmd!(ctx)` is prepended to the body, so
 * every use of the command ends up in the tracing output with its
 * invocation string and author.
 */
#[proc_macro_attribute]
pub fn log_cmd(_macro_attrs: TokenStream, command: TokenStream) -> TokenStream {
    let mut command = parse_macro_input!(command as ItemFn);

    // The context is always the first argument of a poise command:
    let Some(first_arg) = command.sig.inputs.first() else {
        return darling::Error::from(syn::Error::new(
            command.sig.span(),
            "[log_cmd] command must take the poise context as its first argument",
        ))
        .write_errors()
        .into();
    };
    let syn::FnArg::Typed(ctx_arg) = first_arg else {
        // syn::FnArg::Receiver(_)
        return darling::Error::from(syn::Error::new(
            first_arg.span(),
            "[log_cmd] commands cannot take `self`",
        ))
        .write_errors()
        .into();
    };
    let syn::Pat::Ident(pat) = &*ctx_arg.pat else {
        return darling::Error::from(syn::Error::new(
            ctx_arg.pat.span(),
            "[log_cmd] the context argument must be a plain identifier",
        ))
        .write_errors()
        .into();
    };
    let ctx_ident = pat.ident.clone();

    let log_stmt: Stmt = parse_quote! {
        crate::utils::log_cmd!(#ctx_ident);
    };
    command.block.stmts.insert(0, log_stmt);

    command.into_token_stream().into()
}
