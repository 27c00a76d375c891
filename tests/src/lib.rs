#[cfg(test)]
mod search;
#[cfg(test)]
mod support;
